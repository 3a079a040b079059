use std::fmt;

/// Opaque face identity payload produced by the swap engine.
///
/// The pipeline stores and forwards these bytes without interpreting them;
/// only the engine that produced a descriptor can consume it.
#[derive(Clone, PartialEq, Eq)]
pub struct FaceDescriptor {
    bytes: Vec<u8>,
}

impl FaceDescriptor {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for FaceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FaceDescriptor({} bytes)", self.bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_reports_length_not_contents() {
        let descriptor = FaceDescriptor::new(vec![0xde, 0xad, 0xbe, 0xef]);
        let rendered = format!("{descriptor:?}");
        assert_eq!(rendered, "FaceDescriptor(4 bytes)");
        assert!(!rendered.contains("de"));
    }

    #[test]
    fn test_clone_preserves_bytes() {
        let descriptor = FaceDescriptor::new(vec![1, 2, 3]);
        assert_eq!(descriptor.clone(), descriptor);
        assert_eq!(descriptor.bytes(), &[1, 2, 3]);
    }
}
