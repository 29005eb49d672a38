use crate::attribute::{saturating_u32, Composite, LengthGuard, Payload};
use crate::{ClassBuffer, ClassFileResult, ClassWriter, ConstantPool};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BootstrapMethod {
    /// Index of a `MethodHandle` constant.
    pub bootstrap_method_ref: u16,
    pub bootstrap_arguments: Vec<u16>,
}

impl BootstrapMethod {
    fn encoded_len(&self) -> usize {
        2 + 2 + 2 * self.bootstrap_arguments.len()
    }
}

/// Bootstrap methods referenced by `Dynamic` and `InvokeDynamic` constants. The length is
/// cached like [`Code`](crate::Code).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BootstrapMethods {
    methods: Vec<BootstrapMethod>,
    length: u32,
}

impl BootstrapMethods {
    pub fn new(methods: Vec<BootstrapMethod>) -> BootstrapMethods {
        let mut result = BootstrapMethods { methods, length: 0 };
        result.recompute_length();
        result
    }

    pub(crate) fn read(buf: &mut ClassBuffer<'_>) -> ClassFileResult<BootstrapMethods> {
        let methods = buf.read_vec(|buf| {
            Ok(BootstrapMethod {
                bootstrap_method_ref: buf.read_u16()?,
                bootstrap_arguments: buf.read_vec(ClassBuffer::read_u16)?,
            })
        })?;
        Ok(BootstrapMethods::new(methods))
    }

    pub fn calculate_length(&self) -> usize {
        2 + self
            .methods
            .iter()
            .map(BootstrapMethod::encoded_len)
            .sum::<usize>()
    }

    pub fn methods(&self) -> &[BootstrapMethod] {
        &self.methods
    }

    pub fn methods_mut(&mut self) -> LengthGuard<'_, BootstrapMethods, Vec<BootstrapMethod>> {
        LengthGuard::new(self, |attr| &attr.methods, |attr| &mut attr.methods)
    }

    pub fn get(&self, index: u16) -> Option<&BootstrapMethod> {
        self.methods.get(index as usize)
    }
}

impl Payload for BootstrapMethods {
    fn payload_len(&self) -> usize {
        self.length as usize
    }

    fn write_payload(&self, w: &mut ClassWriter, _pool: &ConstantPool) -> ClassFileResult<()> {
        w.write_vec("bootstrap methods", &self.methods, |w, method| {
            w.write_u16(method.bootstrap_method_ref);
            w.write_vec("bootstrap arguments", &method.bootstrap_arguments, |w, arg| {
                w.write_u16(*arg);
                Ok(())
            })
        })
    }
}

impl Composite for BootstrapMethods {
    fn length(&self) -> u32 {
        self.length
    }

    fn recompute_length(&mut self) {
        self.length = saturating_u32(self.calculate_length());
    }
}
