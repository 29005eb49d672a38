use crate::attribute::{find_attribute, find_attribute_mut, read_attributes, write_attributes};
use crate::{
    AnnotationDefault, Annotations, Attribute, AttributeInfo, ClassBuffer, ClassFileResult,
    ClassWriter, Code, ConstantPool, ConstantValue, Exceptions, FieldAccess, MethodAccess,
    MethodParameters, ParameterAnnotations, ReadOptions, Signature,
};
use java_string::JavaStr;

macro_rules! member_accessors {
    ($member:ident, $access:ident) => {
        impl $member {
            pub fn name<'pool>(&self, pool: &'pool ConstantPool) -> ClassFileResult<&'pool JavaStr> {
                pool.get_utf8(self.name_index)
            }

            pub fn descriptor<'pool>(
                &self,
                pool: &'pool ConstantPool,
            ) -> ClassFileResult<&'pool JavaStr> {
                pool.get_utf8(self.descriptor_index)
            }

            pub fn signature(&self) -> Option<&Signature> {
                find_attribute(&self.attributes, AttributeInfo::as_signature)
            }

            pub fn is_deprecated(&self) -> bool {
                self.attributes
                    .iter()
                    .any(|attribute| attribute.info.is_deprecated())
            }

            pub fn runtime_visible_annotations(&self) -> Option<&Annotations> {
                find_attribute(
                    &self.attributes,
                    AttributeInfo::as_runtime_visible_annotations,
                )
            }

            pub fn runtime_invisible_annotations(&self) -> Option<&Annotations> {
                find_attribute(
                    &self.attributes,
                    AttributeInfo::as_runtime_invisible_annotations,
                )
            }

            pub(crate) fn read(
                buf: &mut ClassBuffer<'_>,
                pool: &ConstantPool,
                options: &ReadOptions,
            ) -> ClassFileResult<$member> {
                Ok($member {
                    access: $access::from_bits_retain(buf.read_u16()?),
                    name_index: buf.read_u16()?,
                    descriptor_index: buf.read_u16()?,
                    attributes: read_attributes(buf, pool, options)?,
                })
            }

            pub(crate) fn write(
                &self,
                w: &mut ClassWriter,
                pool: &ConstantPool,
            ) -> ClassFileResult<()> {
                w.write_u16(self.access.bits());
                w.write_u16(self.name_index);
                w.write_u16(self.descriptor_index);
                write_attributes(w, &self.attributes, pool)
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub access: FieldAccess,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Vec<Attribute>,
}

member_accessors!(FieldInfo, FieldAccess);

impl FieldInfo {
    pub fn constant_value(&self) -> Option<&ConstantValue> {
        find_attribute(&self.attributes, AttributeInfo::as_constant_value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    pub access: MethodAccess,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Vec<Attribute>,
}

member_accessors!(MethodInfo, MethodAccess);

impl MethodInfo {
    /// The method body, absent for `abstract` and `native` methods.
    pub fn code(&self) -> Option<&Code> {
        find_attribute(&self.attributes, AttributeInfo::as_code)
    }

    pub fn code_mut(&mut self) -> Option<&mut Code> {
        find_attribute_mut(&mut self.attributes, AttributeInfo::as_code_mut)
    }

    pub fn exceptions(&self) -> Option<&Exceptions> {
        find_attribute(&self.attributes, AttributeInfo::as_exceptions)
    }

    pub fn method_parameters(&self) -> Option<&MethodParameters> {
        find_attribute(&self.attributes, AttributeInfo::as_method_parameters)
    }

    pub fn annotation_default(&self) -> Option<&AnnotationDefault> {
        find_attribute(&self.attributes, AttributeInfo::as_annotation_default)
    }

    pub fn runtime_visible_parameter_annotations(&self) -> Option<&ParameterAnnotations> {
        find_attribute(
            &self.attributes,
            AttributeInfo::as_runtime_visible_parameter_annotations,
        )
    }

    /// The names of the checked exceptions this method declares.
    pub fn exception_names<'pool>(
        &self,
        pool: &'pool ConstantPool,
    ) -> ClassFileResult<Vec<&'pool JavaStr>> {
        self.exceptions()
            .map(|exceptions| exceptions.exception_index_table.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&index| pool.class_name(index))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use crate::{
        Attribute, AttributeInfo, ClassBuffer, ClassWriter, Code, ConstantPool, Exceptions,
        MethodAccess, MethodInfo, ReadOptions,
    };

    #[test]
    fn test_first_code_attribute_wins() {
        let mut pool = ConstantPool::new();
        let first = Attribute::new(
            &mut pool,
            AttributeInfo::Code(Code::new(1, 0, vec![0xb1], Vec::new(), Vec::new())),
        )
        .unwrap();
        let second = Attribute::new(
            &mut pool,
            AttributeInfo::Code(Code::new(2, 0, vec![0xb1], Vec::new(), Vec::new())),
        )
        .unwrap();
        let mut method = MethodInfo {
            access: MethodAccess::Public,
            name_index: pool.add_utf8("run").unwrap(),
            descriptor_index: pool.add_utf8("()V").unwrap(),
            attributes: vec![first, second],
        };
        assert_eq!(1, method.code().unwrap().max_stack);
        method.code_mut().unwrap().max_stack = 3;
        assert_eq!(3, method.code().unwrap().max_stack);
        assert_eq!(2, method.attributes[1].info.as_code().unwrap().max_stack);
    }

    #[test]
    fn test_method_round_trip() {
        let mut pool = ConstantPool::new();
        let exception = pool.add_class("java/io/IOException").unwrap();
        let exceptions = Attribute::new(
            &mut pool,
            AttributeInfo::Exceptions(Exceptions {
                exception_index_table: vec![exception],
            }),
        )
        .unwrap();
        let method = MethodInfo {
            access: MethodAccess::Public | MethodAccess::Abstract,
            name_index: pool.add_utf8("read").unwrap(),
            descriptor_index: pool.add_utf8("()I").unwrap(),
            attributes: vec![exceptions],
        };

        let mut writer = ClassWriter::new();
        method.write(&mut writer, &pool).unwrap();
        let mut buf = ClassBuffer::new(writer.as_bytes());
        let reread = MethodInfo::read(&mut buf, &pool, &ReadOptions::default()).unwrap();
        assert!(buf.is_empty());
        assert_eq!(method, reread);
        assert_eq!("read", reread.name(&pool).unwrap().as_str().unwrap());
        assert_eq!(
            vec!["java/io/IOException"],
            reread
                .exception_names(&pool)
                .unwrap()
                .into_iter()
                .map(|name| name.as_str().unwrap())
                .collect::<Vec<_>>()
        );
        assert!(reread.code().is_none());
    }
}
