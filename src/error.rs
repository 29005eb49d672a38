use crate::ConstantPoolTag;
use java_string::{JavaString, Utf8Error};
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClassFileError {
    #[error("bad element value tag: {0:#04x}")]
    BadAnnotationTag(u8),
    #[error("attribute {name} declared length {declared} but its payload is {actual} bytes")]
    AttributeLengthMismatch {
        name: JavaString,
        declared: u32,
        actual: usize,
    },
    #[error("unknown attribute {name} has length {len}, above the limit of {max}")]
    AttributeTooLarge { name: JavaString, len: u32, max: u32 },
    #[error("attribute name index {index} does not refer to a Utf8 constant")]
    BadAttributeName { index: u16 },
    #[error("bad constant pool index: {index}, len {len}")]
    BadConstantPoolIndex { index: u16, len: usize },
    #[error("no entry at constant pool index: {0}")]
    BadConstantPoolIndexNoEntry(u16),
    #[error("bad constant pool tag: {0}")]
    BadConstantPoolTag(u8),
    #[error("bad constant pool tag at index {index}: {actual}, expected {expected}")]
    BadConstantPoolType {
        index: u16,
        expected: ConstantPoolTag,
        actual: ConstantPoolTag,
    },
    #[error("constant at index {index} occupies {actual} slot(s), replacement needs {expected}")]
    ConstantSlotMismatch {
        index: u16,
        expected: usize,
        actual: usize,
    },
    #[error("constant pool count must be at least 1")]
    EmptyConstantPool,
    #[error("bad handle kind: {0}")]
    BadHandleKind(u8),
    #[error("bad magic number: {0:#010x}")]
    BadMagic(u32),
    #[error("bad stack map frame type: {0}")]
    BadStackMapFrameType(u8),
    #[error("bad verification type tag: {0}")]
    BadVerificationTypeTag(u8),
    #[error("circular class hierarchy involving {0}")]
    ClassCircularity(JavaString),
    #[error("class not found: {0}")]
    ClassNotFound(JavaString),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("read past the end of the class file, index {index}, len {len}")]
    OutOfBounds { index: usize, len: usize },
    #[error("too deep annotation nesting, limit {0}")]
    TooDeepAnnotationNesting(usize),
    #[error("too many {what}: {count}, at most {max} allowed")]
    TooManyEntries {
        what: &'static str,
        count: usize,
        max: usize,
    },
    #[error("8-byte constant at index {0} has no room for its second slot")]
    TruncatedWideConstant(u16),
    #[error("{0} unexpected bytes after the end of the class")]
    TrailingBytes(usize),
    #[error("unknown attributes must be given a name")]
    UnnamedAttribute,
    #[error("unsupported class file version: {0}")]
    UnsupportedVersion(u16),
    #[error("utf8 error: {0}")]
    Utf8(#[from] Utf8Error),
}

/// The broad category of a [`ClassFileError`].
///
/// None of these are retryable: a malformed stream stays malformed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The byte stream does not describe a well-formed class file.
    StructuralFormat,
    /// A declared size exceeds a configured or format-imposed limit.
    ResourceLimit,
    /// A class hierarchy loops back on itself.
    Circularity,
    /// An accessor was handed an index that does not name a usable entry.
    CallerMisuse,
    /// The class lookup could not resolve a name.
    NotFound,
    /// The output sink failed.
    Io,
}

impl ClassFileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClassFileError::BadAnnotationTag(_)
            | ClassFileError::AttributeLengthMismatch { .. }
            | ClassFileError::BadAttributeName { .. }
            | ClassFileError::BadConstantPoolTag(_)
            | ClassFileError::EmptyConstantPool
            | ClassFileError::BadHandleKind(_)
            | ClassFileError::BadMagic(_)
            | ClassFileError::BadStackMapFrameType(_)
            | ClassFileError::BadVerificationTypeTag(_)
            | ClassFileError::OutOfBounds { .. }
            | ClassFileError::TrailingBytes(_)
            | ClassFileError::TruncatedWideConstant(_)
            | ClassFileError::Utf8(_) => ErrorKind::StructuralFormat,
            ClassFileError::AttributeTooLarge { .. }
            | ClassFileError::TooDeepAnnotationNesting(_)
            | ClassFileError::TooManyEntries { .. }
            | ClassFileError::UnsupportedVersion(_) => ErrorKind::ResourceLimit,
            ClassFileError::ClassCircularity(_) => ErrorKind::Circularity,
            ClassFileError::BadConstantPoolIndex { .. }
            | ClassFileError::BadConstantPoolIndexNoEntry(_)
            | ClassFileError::BadConstantPoolType { .. }
            | ClassFileError::ConstantSlotMismatch { .. }
            | ClassFileError::UnnamedAttribute => ErrorKind::CallerMisuse,
            ClassFileError::ClassNotFound(_) => ErrorKind::NotFound,
            ClassFileError::Io(_) => ErrorKind::Io,
        }
    }
}

pub type ClassFileResult<T> = Result<T, ClassFileError>;
