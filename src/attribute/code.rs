use crate::attribute::{
    attributes_len, find_attribute, read_attributes, saturating_u32, write_attributes, Composite,
    LengthGuard, Payload,
};
use crate::{
    Attribute, AttributeInfo, ClassBuffer, ClassFileResult, ClassWriter, ConstantPool,
    LineNumberTable, LocalVariableTable, LocalVariableTypeTable, ReadOptions, StackMapTable,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    /// Zero for a handler that catches everything.
    pub catch_type: u16,
}

impl ExceptionTableEntry {
    fn read(buf: &mut ClassBuffer<'_>) -> ClassFileResult<ExceptionTableEntry> {
        Ok(ExceptionTableEntry {
            start_pc: buf.read_u16()?,
            end_pc: buf.read_u16()?,
            handler_pc: buf.read_u16()?,
            catch_type: buf.read_u16()?,
        })
    }

    fn write(&self, w: &mut ClassWriter) -> ClassFileResult<()> {
        w.write_u16(self.start_pc);
        w.write_u16(self.end_pc);
        w.write_u16(self.handler_pc);
        w.write_u16(self.catch_type);
        Ok(())
    }

    /// Whether this handler guards the instruction at `pc`.
    pub fn covers(&self, pc: u16) -> bool {
        (self.start_pc..self.end_pc).contains(&pc)
    }
}

/// A method body. The bytecode is kept as raw bytes.
///
/// The length is cached and recomputed whenever the exception table or the nested attributes
/// change, so it always equals
/// `2 + 2 + 4 + code.len() + 2 + 8 * exception_table.len() + 2 + Σ(6 + nested length)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    pub max_stack: u16,
    pub max_locals: u16,
    code: Vec<u8>,
    exception_table: Vec<ExceptionTableEntry>,
    attributes: Vec<Attribute>,
    length: u32,
}

impl Code {
    pub fn new(
        max_stack: u16,
        max_locals: u16,
        code: Vec<u8>,
        exception_table: Vec<ExceptionTableEntry>,
        attributes: Vec<Attribute>,
    ) -> Code {
        let mut result = Code {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
            length: 0,
        };
        result.recompute_length();
        result
    }

    pub(crate) fn read(
        buf: &mut ClassBuffer<'_>,
        pool: &ConstantPool,
        options: &ReadOptions,
    ) -> ClassFileResult<Code> {
        let max_stack = buf.read_u16()?;
        let max_locals = buf.read_u16()?;
        let code_length = buf.read_u32()? as usize;
        let code = buf.read_bytes(code_length)?.to_vec();
        let exception_table = buf.read_vec(ExceptionTableEntry::read)?;
        let attributes = read_attributes(buf, pool, options)?;
        Ok(Code::new(
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        ))
    }

    pub fn calculate_length(&self) -> usize {
        2 + 2
            + 4
            + self.code.len()
            + 2
            + 8 * self.exception_table.len()
            + attributes_len(&self.attributes)
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn code_mut(&mut self) -> LengthGuard<'_, Code, Vec<u8>> {
        LengthGuard::new(self, |code| &code.code, |code| &mut code.code)
    }

    pub fn exception_table(&self) -> &[ExceptionTableEntry] {
        &self.exception_table
    }

    pub fn exception_table_mut(&mut self) -> LengthGuard<'_, Code, Vec<ExceptionTableEntry>> {
        LengthGuard::new(
            self,
            |code| &code.exception_table,
            |code| &mut code.exception_table,
        )
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> LengthGuard<'_, Code, Vec<Attribute>> {
        LengthGuard::new(self, |code| &code.attributes, |code| &mut code.attributes)
    }

    pub fn line_number_table(&self) -> Option<&LineNumberTable> {
        find_attribute(&self.attributes, AttributeInfo::as_line_number_table)
    }

    pub fn local_variable_table(&self) -> Option<&LocalVariableTable> {
        find_attribute(&self.attributes, AttributeInfo::as_local_variable_table)
    }

    pub fn local_variable_type_table(&self) -> Option<&LocalVariableTypeTable> {
        find_attribute(&self.attributes, AttributeInfo::as_local_variable_type_table)
    }

    pub fn stack_map_table(&self) -> Option<&StackMapTable> {
        find_attribute(&self.attributes, AttributeInfo::as_stack_map_table)
    }

    /// The handlers guarding `pc`, innermost first as listed in the table.
    pub fn handlers_at(&self, pc: u16) -> impl Iterator<Item = &ExceptionTableEntry> + '_ {
        self.exception_table
            .iter()
            .filter(move |entry| entry.covers(pc))
    }
}

impl Payload for Code {
    fn payload_len(&self) -> usize {
        self.length as usize
    }

    fn write_payload(&self, w: &mut ClassWriter, pool: &ConstantPool) -> ClassFileResult<()> {
        w.write_u16(self.max_stack);
        w.write_u16(self.max_locals);
        w.write_u32(saturating_u32(self.code.len()));
        w.write_bytes(&self.code);
        w.write_vec("exception handlers", &self.exception_table, |w, entry| {
            entry.write(w)
        })?;
        write_attributes(w, &self.attributes, pool)
    }
}

impl Composite for Code {
    fn length(&self) -> u32 {
        self.length
    }

    fn recompute_length(&mut self) {
        self.length = saturating_u32(self.calculate_length());
    }
}

#[cfg(test)]
mod test {
    use crate::attribute::{Composite, Payload};
    use crate::{
        Attribute, AttributeInfo, ClassBuffer, ClassWriter, Code, ConstantPool,
        ExceptionTableEntry, LineNumber, LineNumberTable, ReadOptions,
    };

    fn line_numbers(pool: &mut ConstantPool, count: u16) -> Attribute {
        let line_numbers = (0..count)
            .map(|line| LineNumber {
                start_pc: line,
                line_number: line + 1,
            })
            .collect();
        Attribute::new(
            pool,
            AttributeInfo::LineNumberTable(LineNumberTable { line_numbers }),
        )
        .unwrap()
    }

    #[test]
    fn test_length_follows_children() {
        let mut pool = ConstantPool::new();
        let mut code = Code::new(1, 1, vec![0xb1], Vec::new(), Vec::new());
        assert_eq!(13, code.length());

        code.exception_table_mut().push(ExceptionTableEntry {
            start_pc: 0,
            end_pc: 1,
            handler_pc: 0,
            catch_type: 0,
        });
        assert_eq!(21, code.length());

        let table = line_numbers(&mut pool, 2);
        code.attributes_mut().push(table);
        assert_eq!(21 + 6 + 2 + 8, code.length());

        code.code_mut().extend_from_slice(&[0, 0]);
        assert_eq!(39, code.length());

        code.attributes_mut().clear();
        assert_eq!(23, code.length());
        assert_eq!(code.calculate_length(), code.length() as usize);
    }

    #[test]
    fn test_nested_growth_propagates_on_write() {
        let mut pool = ConstantPool::new();
        let table = line_numbers(&mut pool, 1);
        let mut code = Code::new(0, 0, vec![0xb1], Vec::new(), vec![table]);
        let before = code.length();

        let mut attributes = code.attributes_mut();
        if let Some(table) = attributes[0].info.as_line_number_table_mut() {
            table.line_numbers.push(LineNumber {
                start_pc: 1,
                line_number: 3,
            });
        }
        drop(attributes);
        assert_eq!(before + 4, code.length());

        let mut writer = ClassWriter::new();
        code.write_payload(&mut writer, &pool).unwrap();
        assert_eq!(code.length() as usize, writer.len());

        let mut buf = ClassBuffer::new(writer.as_bytes());
        let reread = Code::read(&mut buf, &pool, &ReadOptions::default()).unwrap();
        assert!(buf.is_empty());
        assert_eq!(code, reread);
        assert_eq!(Some(3), reread.line_number_table().unwrap().source_line(1));
    }

    #[test]
    fn test_handlers_at() {
        let entry = |start_pc, end_pc, catch_type| ExceptionTableEntry {
            start_pc,
            end_pc,
            handler_pc: 20,
            catch_type,
        };
        let code = Code::new(
            0,
            0,
            vec![0; 20],
            vec![entry(0, 10, 1), entry(5, 15, 2)],
            Vec::new(),
        );
        let catches = |pc| code.handlers_at(pc).map(|e| e.catch_type).collect::<Vec<_>>();
        assert_eq!(vec![1], catches(0));
        assert_eq!(vec![1, 2], catches(5));
        assert_eq!(vec![2], catches(10));
        assert!(catches(15).is_empty());
    }
}
