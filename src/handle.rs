use crate::{ClassFileError, ClassFileResult, ConstantPoolTag};
use strum::{Display, FromRepr};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, FromRepr)]
#[repr(u8)]
#[non_exhaustive]
pub enum HandleKind {
    GetField = 1,
    GetStatic = 2,
    PutField = 3,
    PutStatic = 4,
    InvokeVirtual = 5,
    InvokeStatic = 6,
    InvokeSpecial = 7,
    NewInvokeSpecial = 8,
    InvokeInterface = 9,
}

impl HandleKind {
    pub fn from_u8(tag: u8) -> ClassFileResult<HandleKind> {
        Self::from_repr(tag).ok_or(ClassFileError::BadHandleKind(tag))
    }

    pub fn is_field_access(self) -> bool {
        matches!(
            self,
            HandleKind::GetField | HandleKind::GetStatic | HandleKind::PutField | HandleKind::PutStatic
        )
    }

    /// Whether a handle of this kind may reference a constant with the given tag.
    pub fn accepts(self, tag: ConstantPoolTag) -> bool {
        match self {
            HandleKind::GetField
            | HandleKind::GetStatic
            | HandleKind::PutField
            | HandleKind::PutStatic => tag == ConstantPoolTag::FieldRef,
            HandleKind::InvokeVirtual | HandleKind::NewInvokeSpecial => {
                tag == ConstantPoolTag::MethodRef
            }
            HandleKind::InvokeInterface => tag == ConstantPoolTag::InterfaceMethodRef,
            HandleKind::InvokeStatic | HandleKind::InvokeSpecial => matches!(
                tag,
                ConstantPoolTag::MethodRef | ConstantPoolTag::InterfaceMethodRef
            ),
        }
    }
}
