use crate::attribute::{
    attributes_len, find_attribute, read_attributes, saturating_u32, write_attributes, Composite,
    LengthGuard, Payload,
};
use crate::{
    Attribute, AttributeInfo, ClassBuffer, ClassFileResult, ClassWriter, ConstantPool,
    ReadOptions, Signature,
};
use java_string::JavaStr;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordComponent {
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Vec<Attribute>,
}

impl RecordComponent {
    fn read(
        buf: &mut ClassBuffer<'_>,
        pool: &ConstantPool,
        options: &ReadOptions,
    ) -> ClassFileResult<RecordComponent> {
        Ok(RecordComponent {
            name_index: buf.read_u16()?,
            descriptor_index: buf.read_u16()?,
            attributes: read_attributes(buf, pool, options)?,
        })
    }

    pub fn encoded_len(&self) -> usize {
        4 + attributes_len(&self.attributes)
    }

    pub fn name<'pool>(&self, pool: &'pool ConstantPool) -> ClassFileResult<&'pool JavaStr> {
        pool.get_utf8(self.name_index)
    }

    pub fn descriptor<'pool>(&self, pool: &'pool ConstantPool) -> ClassFileResult<&'pool JavaStr> {
        pool.get_utf8(self.descriptor_index)
    }

    pub fn signature(&self) -> Option<&Signature> {
        find_attribute(&self.attributes, AttributeInfo::as_signature)
    }
}

/// The components of a record class. The length is cached like [`Code`](crate::Code) and
/// includes the attributes of every component.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    components: Vec<RecordComponent>,
    length: u32,
}

impl Record {
    pub fn new(components: Vec<RecordComponent>) -> Record {
        let mut result = Record {
            components,
            length: 0,
        };
        result.recompute_length();
        result
    }

    pub(crate) fn read(
        buf: &mut ClassBuffer<'_>,
        pool: &ConstantPool,
        options: &ReadOptions,
    ) -> ClassFileResult<Record> {
        let components = buf.read_vec(|buf| RecordComponent::read(buf, pool, options))?;
        Ok(Record::new(components))
    }

    pub fn calculate_length(&self) -> usize {
        2 + self
            .components
            .iter()
            .map(RecordComponent::encoded_len)
            .sum::<usize>()
    }

    pub fn components(&self) -> &[RecordComponent] {
        &self.components
    }

    pub fn components_mut(&mut self) -> LengthGuard<'_, Record, Vec<RecordComponent>> {
        LengthGuard::new(
            self,
            |record| &record.components,
            |record| &mut record.components,
        )
    }
}

impl Payload for Record {
    fn payload_len(&self) -> usize {
        self.length as usize
    }

    fn write_payload(&self, w: &mut ClassWriter, pool: &ConstantPool) -> ClassFileResult<()> {
        w.write_vec("record components", &self.components, |w, component| {
            w.write_u16(component.name_index);
            w.write_u16(component.descriptor_index);
            write_attributes(w, &component.attributes, pool)
        })
    }
}

impl Composite for Record {
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
        Attribute, AttributeInfo, ClassBuffer, ClassWriter, ConstantPool, ReadOptions, Record,
        RecordComponent, Signature,
    };

    #[test]
    fn test_component_attributes_count_towards_length() {
        let mut pool = ConstantPool::new();
        let name_index = pool.add_utf8("x").unwrap();
        let descriptor_index = pool.add_utf8("I").unwrap();
        let mut record = Record::new(vec![RecordComponent {
            name_index,
            descriptor_index,
            attributes: Vec::new(),
        }]);
        assert_eq!(8, record.length());

        let signature = Attribute::new(
            &mut pool,
            AttributeInfo::Signature(Signature {
                signature_index: descriptor_index,
            }),
        )
        .unwrap();
        record.components_mut()[0].attributes.push(signature);
        assert_eq!(16, record.length());

        let mut writer = ClassWriter::new();
        record.write_payload(&mut writer, &pool).unwrap();
        assert_eq!(16, writer.len());

        let mut buf = ClassBuffer::new(writer.as_bytes());
        let reread = Record::read(&mut buf, &pool, &ReadOptions::default()).unwrap();
        assert_eq!(record, reread);
        let component = &reread.components()[0];
        assert_eq!("x", component.name(&pool).unwrap().as_str().unwrap());
        assert_eq!(
            Some(descriptor_index),
            component.signature().map(|sig| sig.signature_index)
        );
    }
}
