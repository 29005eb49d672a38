use crate::attribute::Payload;
use crate::{ClassBuffer, ClassFileResult, ClassWriter, ConstantPool, ParameterAccess};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SourceFile {
    pub sourcefile_index: u16,
}

impl SourceFile {
    pub(crate) fn read(buf: &mut ClassBuffer<'_>) -> ClassFileResult<SourceFile> {
        Ok(SourceFile {
            sourcefile_index: buf.read_u16()?,
        })
    }
}

impl Payload for SourceFile {
    fn payload_len(&self) -> usize {
        2
    }

    fn write_payload(&self, w: &mut ClassWriter, _pool: &ConstantPool) -> ClassFileResult<()> {
        w.write_u16(self.sourcefile_index);
        Ok(())
    }
}

/// The value of a `static final` field: an `Integer`, `Float`, `Long`, `Double` or `String`
/// constant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ConstantValue {
    pub constantvalue_index: u16,
}

impl ConstantValue {
    pub(crate) fn read(buf: &mut ClassBuffer<'_>) -> ClassFileResult<ConstantValue> {
        Ok(ConstantValue {
            constantvalue_index: buf.read_u16()?,
        })
    }
}

impl Payload for ConstantValue {
    fn payload_len(&self) -> usize {
        2
    }

    fn write_payload(&self, w: &mut ClassWriter, _pool: &ConstantPool) -> ClassFileResult<()> {
        w.write_u16(self.constantvalue_index);
        Ok(())
    }
}

/// The checked exceptions a method declares, as `Class` indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Exceptions {
    pub exception_index_table: Vec<u16>,
}

impl Exceptions {
    pub(crate) fn read(buf: &mut ClassBuffer<'_>) -> ClassFileResult<Exceptions> {
        Ok(Exceptions {
            exception_index_table: buf.read_vec(ClassBuffer::read_u16)?,
        })
    }
}

impl Payload for Exceptions {
    fn payload_len(&self) -> usize {
        2 + 2 * self.exception_index_table.len()
    }

    fn write_payload(&self, w: &mut ClassWriter, _pool: &ConstantPool) -> ClassFileResult<()> {
        w.write_vec("exceptions", &self.exception_index_table, |w, index| {
            w.write_u16(*index);
            Ok(())
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub signature_index: u16,
}

impl Signature {
    pub(crate) fn read(buf: &mut ClassBuffer<'_>) -> ClassFileResult<Signature> {
        Ok(Signature {
            signature_index: buf.read_u16()?,
        })
    }
}

impl Payload for Signature {
    fn payload_len(&self) -> usize {
        2
    }

    fn write_payload(&self, w: &mut ClassWriter, _pool: &ConstantPool) -> ClassFileResult<()> {
        w.write_u16(self.signature_index);
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Synthetic;

impl Payload for Synthetic {
    fn payload_len(&self) -> usize {
        0
    }

    fn write_payload(&self, _w: &mut ClassWriter, _pool: &ConstantPool) -> ClassFileResult<()> {
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Deprecated;

impl Payload for Deprecated {
    fn payload_len(&self) -> usize {
        0
    }

    fn write_payload(&self, _w: &mut ClassWriter, _pool: &ConstantPool) -> ClassFileResult<()> {
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LineNumber {
    pub start_pc: u16,
    pub line_number: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct LineNumberTable {
    pub line_numbers: Vec<LineNumber>,
}

impl LineNumberTable {
    pub(crate) fn read(buf: &mut ClassBuffer<'_>) -> ClassFileResult<LineNumberTable> {
        let line_numbers = buf.read_vec(|buf| {
            Ok(LineNumber {
                start_pc: buf.read_u16()?,
                line_number: buf.read_u16()?,
            })
        })?;
        Ok(LineNumberTable { line_numbers })
    }

    /// The source line of the instruction at `pc`: the entry with the greatest `start_pc` not
    /// after it.
    pub fn source_line(&self, pc: u16) -> Option<u16> {
        self.line_numbers
            .iter()
            .filter(|entry| entry.start_pc <= pc)
            .max_by_key(|entry| entry.start_pc)
            .map(|entry| entry.line_number)
    }
}

impl Payload for LineNumberTable {
    fn payload_len(&self) -> usize {
        2 + 4 * self.line_numbers.len()
    }

    fn write_payload(&self, w: &mut ClassWriter, _pool: &ConstantPool) -> ClassFileResult<()> {
        w.write_vec("line numbers", &self.line_numbers, |w, entry| {
            w.write_u16(entry.start_pc);
            w.write_u16(entry.line_number);
            Ok(())
        })
    }
}

/// An entry of a `LocalVariableTable`, or of a `LocalVariableTypeTable` in which case
/// `descriptor_index` points at a generic signature.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LocalVariable {
    pub start_pc: u16,
    pub length: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub index: u16,
}

impl LocalVariable {
    fn read(buf: &mut ClassBuffer<'_>) -> ClassFileResult<LocalVariable> {
        Ok(LocalVariable {
            start_pc: buf.read_u16()?,
            length: buf.read_u16()?,
            name_index: buf.read_u16()?,
            descriptor_index: buf.read_u16()?,
            index: buf.read_u16()?,
        })
    }

    fn write(&self, w: &mut ClassWriter) -> ClassFileResult<()> {
        w.write_u16(self.start_pc);
        w.write_u16(self.length);
        w.write_u16(self.name_index);
        w.write_u16(self.descriptor_index);
        w.write_u16(self.index);
        Ok(())
    }

    /// Whether this variable is live at `pc`.
    pub fn covers(&self, pc: u16) -> bool {
        let start = self.start_pc as u32;
        (start..start + self.length as u32).contains(&(pc as u32))
    }
}

fn find_local(entries: &[LocalVariable], index: u16, pc: u16) -> Option<&LocalVariable> {
    entries
        .iter()
        .find(|entry| entry.index == index && entry.covers(pc))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct LocalVariableTable {
    pub local_variables: Vec<LocalVariable>,
}

impl LocalVariableTable {
    pub(crate) fn read(buf: &mut ClassBuffer<'_>) -> ClassFileResult<LocalVariableTable> {
        Ok(LocalVariableTable {
            local_variables: buf.read_vec(LocalVariable::read)?,
        })
    }

    pub fn local_variable(&self, index: u16, pc: u16) -> Option<&LocalVariable> {
        find_local(&self.local_variables, index, pc)
    }
}

impl Payload for LocalVariableTable {
    fn payload_len(&self) -> usize {
        2 + 10 * self.local_variables.len()
    }

    fn write_payload(&self, w: &mut ClassWriter, _pool: &ConstantPool) -> ClassFileResult<()> {
        w.write_vec("local variables", &self.local_variables, |w, entry| {
            entry.write(w)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct LocalVariableTypeTable {
    pub local_variable_types: Vec<LocalVariable>,
}

impl LocalVariableTypeTable {
    pub(crate) fn read(buf: &mut ClassBuffer<'_>) -> ClassFileResult<LocalVariableTypeTable> {
        Ok(LocalVariableTypeTable {
            local_variable_types: buf.read_vec(LocalVariable::read)?,
        })
    }

    pub fn local_variable_type(&self, index: u16, pc: u16) -> Option<&LocalVariable> {
        find_local(&self.local_variable_types, index, pc)
    }
}

impl Payload for LocalVariableTypeTable {
    fn payload_len(&self) -> usize {
        2 + 10 * self.local_variable_types.len()
    }

    fn write_payload(&self, w: &mut ClassWriter, _pool: &ConstantPool) -> ClassFileResult<()> {
        w.write_vec("local variable types", &self.local_variable_types, |w, entry| {
            entry.write(w)
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MethodParameter {
    /// Zero for a parameter without a name.
    pub name_index: u16,
    pub access: ParameterAccess,
}

/// Parameter names and flags; the count is a single byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MethodParameters {
    pub parameters: Vec<MethodParameter>,
}

impl MethodParameters {
    pub(crate) fn read(buf: &mut ClassBuffer<'_>) -> ClassFileResult<MethodParameters> {
        let count = buf.read_u8()?;
        let parameters = (0..count)
            .map(|_| {
                Ok(MethodParameter {
                    name_index: buf.read_u16()?,
                    access: ParameterAccess::from_bits_retain(buf.read_u16()?),
                })
            })
            .collect::<ClassFileResult<Vec<_>>>()?;
        Ok(MethodParameters { parameters })
    }
}

impl Payload for MethodParameters {
    fn payload_len(&self) -> usize {
        1 + 4 * self.parameters.len()
    }

    fn write_payload(&self, w: &mut ClassWriter, _pool: &ConstantPool) -> ClassFileResult<()> {
        w.write_count_u8("method parameters", self.parameters.len())?;
        for parameter in &self.parameters {
            w.write_u16(parameter.name_index);
            w.write_u16(parameter.access.bits());
        }
        Ok(())
    }
}

/// Opaque, tool-specific debug data such as JSR-45 SMAP.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SourceDebugExtension {
    pub debug_extension: Vec<u8>,
}

impl SourceDebugExtension {
    pub(crate) fn read(buf: &mut ClassBuffer<'_>) -> ClassFileResult<SourceDebugExtension> {
        let len = buf.remaining();
        Ok(SourceDebugExtension {
            debug_extension: buf.read_bytes(len)?.to_vec(),
        })
    }
}

impl Payload for SourceDebugExtension {
    fn payload_len(&self) -> usize {
        self.debug_extension.len()
    }

    fn write_payload(&self, w: &mut ClassWriter, _pool: &ConstantPool) -> ClassFileResult<()> {
        w.write_bytes(&self.debug_extension);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{LineNumber, LineNumberTable, LocalVariable, LocalVariableTable};

    #[test]
    fn test_source_line() {
        let table = LineNumberTable {
            line_numbers: vec![
                LineNumber {
                    start_pc: 0,
                    line_number: 10,
                },
                LineNumber {
                    start_pc: 8,
                    line_number: 12,
                },
                LineNumber {
                    start_pc: 4,
                    line_number: 11,
                },
            ],
        };
        assert_eq!(Some(10), table.source_line(3));
        assert_eq!(Some(11), table.source_line(4));
        assert_eq!(Some(12), table.source_line(200));
        assert_eq!(None, LineNumberTable::default().source_line(0));
    }

    #[test]
    fn test_local_variable_lookup_uses_range() {
        let slot = |start_pc, length, name_index| LocalVariable {
            start_pc,
            length,
            name_index,
            descriptor_index: 9,
            index: 1,
        };
        let table = LocalVariableTable {
            local_variables: vec![slot(0, 4, 20), slot(4, 10, 21)],
        };
        assert_eq!(20, table.local_variable(1, 3).unwrap().name_index);
        assert_eq!(21, table.local_variable(1, 4).unwrap().name_index);
        assert!(table.local_variable(1, 14).is_none());
        assert!(table.local_variable(2, 0).is_none());
    }
}
