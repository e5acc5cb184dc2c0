// Device Selector - restricts a query to specific devices

/// Identifies one device for query filtering, either by its zero-based
/// index or by its UUID.
///
/// Selectors are passed through to the tool verbatim; no validation is
/// done here because the tool itself rejects unknown indexes and UUIDs
/// with a non-zero exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSelector(String);

impl DeviceSelector {
    /// Selector for a zero-based device index.
    pub fn index(index: u32) -> Self {
        Self(index.to_string())
    }

    /// Selector for a device UUID ("GPU-..." form).
    pub fn uuid(uuid: impl Into<String>) -> Self {
        Self(uuid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DeviceSelector {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DeviceSelector {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for DeviceSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
