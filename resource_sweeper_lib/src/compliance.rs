use k8s_openapi::api::core::v1::Container;

/// A container complies iff both resource requests and limits are explicitly
/// set. Contents are never inspected, so an empty requests map still counts
/// as set: this catches forgotten constraints, not wrong magnitudes.
pub fn is_compliant(container: &Container) -> bool {
    container
        .resources
        .as_ref()
        .map(|resources| resources.requests.is_some() && resources.limits.is_some())
        .unwrap_or(false)
}
