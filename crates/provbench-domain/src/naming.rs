/// Name prefixes reserved for resources created by acceptance tests.
///
/// Anything outside these prefixes belongs to somebody else and must never be
/// swept.
pub const TEST_RESOURCE_PREFIXES: &[&str] = &[
    "tf-test",
    "tfgen",
    "gke-us-central1-tf",
    "gcs-bucket-tf-test-",
    "ext-tf-test",
    "k8s-fw-",
];

/// Returns true when `name` follows the test-resource naming convention.
pub fn is_sweepable_test_resource(name: &str) -> bool {
    TEST_RESOURCE_PREFIXES.iter().any(|p| name.starts_with(p))
}
