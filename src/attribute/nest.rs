use crate::attribute::{saturating_u32, Composite, LengthGuard, Payload};
use crate::{ClassBuffer, ClassFileResult, ClassWriter, ConstantPool, InnerClassAccess};

fn write_indices(w: &mut ClassWriter, what: &'static str, indices: &[u16]) -> ClassFileResult<()> {
    w.write_vec(what, indices, |w, index| {
        w.write_u16(*index);
        Ok(())
    })
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NestHost {
    pub host_class_index: u16,
}

impl NestHost {
    pub(crate) fn read(buf: &mut ClassBuffer<'_>) -> ClassFileResult<NestHost> {
        Ok(NestHost {
            host_class_index: buf.read_u16()?,
        })
    }
}

impl Payload for NestHost {
    fn payload_len(&self) -> usize {
        2
    }

    fn write_payload(&self, w: &mut ClassWriter, _pool: &ConstantPool) -> ClassFileResult<()> {
        w.write_u16(self.host_class_index);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NestMembers {
    pub classes: Vec<u16>,
}

impl NestMembers {
    pub(crate) fn read(buf: &mut ClassBuffer<'_>) -> ClassFileResult<NestMembers> {
        Ok(NestMembers {
            classes: buf.read_vec(ClassBuffer::read_u16)?,
        })
    }
}

impl Payload for NestMembers {
    fn payload_len(&self) -> usize {
        2 + 2 * self.classes.len()
    }

    fn write_payload(&self, w: &mut ClassWriter, _pool: &ConstantPool) -> ClassFileResult<()> {
        write_indices(w, "nest members", &self.classes)
    }
}

/// The classes allowed to extend a sealed class. The length is cached like
/// [`Code`](crate::Code).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PermittedSubclasses {
    classes: Vec<u16>,
    length: u32,
}

impl PermittedSubclasses {
    pub fn new(classes: Vec<u16>) -> PermittedSubclasses {
        let mut result = PermittedSubclasses { classes, length: 0 };
        result.recompute_length();
        result
    }

    pub(crate) fn read(buf: &mut ClassBuffer<'_>) -> ClassFileResult<PermittedSubclasses> {
        Ok(PermittedSubclasses::new(buf.read_vec(ClassBuffer::read_u16)?))
    }

    pub fn calculate_length(&self) -> usize {
        2 + 2 * self.classes.len()
    }

    pub fn classes(&self) -> &[u16] {
        &self.classes
    }

    pub fn classes_mut(&mut self) -> LengthGuard<'_, PermittedSubclasses, Vec<u16>> {
        LengthGuard::new(self, |attr| &attr.classes, |attr| &mut attr.classes)
    }
}

impl Payload for PermittedSubclasses {
    fn payload_len(&self) -> usize {
        self.length as usize
    }

    fn write_payload(&self, w: &mut ClassWriter, _pool: &ConstantPool) -> ClassFileResult<()> {
        write_indices(w, "permitted subclasses", &self.classes)
    }
}

impl Composite for PermittedSubclasses {
    fn length(&self) -> u32 {
        self.length
    }

    fn recompute_length(&mut self) {
        self.length = saturating_u32(self.calculate_length());
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct InnerClass {
    pub inner_class_info_index: u16,
    /// Zero if the class is not a member.
    pub outer_class_info_index: u16,
    /// Zero for an anonymous class.
    pub inner_name_index: u16,
    pub access: InnerClassAccess,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct InnerClasses {
    pub classes: Vec<InnerClass>,
}

impl InnerClasses {
    pub(crate) fn read(buf: &mut ClassBuffer<'_>) -> ClassFileResult<InnerClasses> {
        let classes = buf.read_vec(|buf| {
            Ok(InnerClass {
                inner_class_info_index: buf.read_u16()?,
                outer_class_info_index: buf.read_u16()?,
                inner_name_index: buf.read_u16()?,
                access: InnerClassAccess::from_bits_retain(buf.read_u16()?),
            })
        })?;
        Ok(InnerClasses { classes })
    }
}

impl Payload for InnerClasses {
    fn payload_len(&self) -> usize {
        2 + 8 * self.classes.len()
    }

    fn write_payload(&self, w: &mut ClassWriter, _pool: &ConstantPool) -> ClassFileResult<()> {
        w.write_vec("inner classes", &self.classes, |w, class| {
            w.write_u16(class.inner_class_info_index);
            w.write_u16(class.outer_class_info_index);
            w.write_u16(class.inner_name_index);
            w.write_u16(class.access.bits());
            Ok(())
        })
    }
}

/// The innermost enclosing method of a local or anonymous class.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct EnclosingMethod {
    pub class_index: u16,
    /// Index of a `NameAndType`, zero outside of a method body.
    pub method_index: u16,
}

impl EnclosingMethod {
    pub(crate) fn read(buf: &mut ClassBuffer<'_>) -> ClassFileResult<EnclosingMethod> {
        Ok(EnclosingMethod {
            class_index: buf.read_u16()?,
            method_index: buf.read_u16()?,
        })
    }
}

impl Payload for EnclosingMethod {
    fn payload_len(&self) -> usize {
        4
    }

    fn write_payload(&self, w: &mut ClassWriter, _pool: &ConstantPool) -> ClassFileResult<()> {
        w.write_u16(self.class_index);
        w.write_u16(self.method_index);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::attribute::Composite;
    use crate::PermittedSubclasses;

    #[test]
    fn test_permitted_subclasses_length() {
        let mut permitted = PermittedSubclasses::new(vec![2, 4]);
        assert_eq!(6, permitted.length());
        permitted.classes_mut().push(6);
        assert_eq!(8, permitted.length());
        permitted.classes_mut().retain(|&index| index != 2);
        assert_eq!(&[4, 6], permitted.classes());
        assert_eq!(6, permitted.length());
    }
}
