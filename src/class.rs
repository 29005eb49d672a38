use crate::attribute::{find_attribute, read_attributes, write_attributes};
use crate::{
    Attribute, AttributeInfo, BootstrapMethods, ClassAccess, ClassBuffer, ClassFileError,
    ClassFileResult, ClassWriter, ConstantPool, EnclosingMethod, FieldInfo, InnerClasses,
    MethodInfo, Module, NestHost, NestMembers, PermittedSubclasses, ReadOptions, Record,
    Signature, SourceFile, MAGIC,
};
use java_string::JavaStr;
use std::io::Write;

/// A parsed class file. Every part of the class refers to the constant pool by index, so
/// cloning a class yields an independent copy.
#[derive(Debug, Clone, PartialEq)]
pub struct JavaClass {
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool: ConstantPool,
    pub access: ClassAccess,
    pub this_class: u16,
    /// Zero for `java/lang/Object` and `module-info`.
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub attributes: Vec<Attribute>,
}

impl JavaClass {
    pub fn parse(data: &[u8]) -> ClassFileResult<JavaClass> {
        JavaClass::parse_with(data, &ReadOptions::default())
    }

    pub fn parse_with(data: &[u8], options: &ReadOptions) -> ClassFileResult<JavaClass> {
        tracing::trace!(len = data.len(), "parsing class");
        let mut buf = ClassBuffer::new(data);

        let magic = buf.read_u32()?;
        if magic != MAGIC {
            return Err(ClassFileError::BadMagic(magic));
        }
        let minor_version = buf.read_u16()?;
        let major_version = buf.read_u16()?;
        if let Some(max) = options.max_major_version {
            if major_version > max {
                return Err(ClassFileError::UnsupportedVersion(major_version));
            }
        }

        let constant_pool = ConstantPool::read(&mut buf, options)?;
        let access = ClassAccess::from_bits_retain(buf.read_u16()?);
        let this_class = buf.read_u16()?;
        let super_class = buf.read_u16()?;
        let interfaces = buf.read_vec(ClassBuffer::read_u16)?;
        let fields = buf.read_vec(|buf| FieldInfo::read(buf, &constant_pool, options))?;
        let methods = buf.read_vec(|buf| MethodInfo::read(buf, &constant_pool, options))?;
        let attributes = read_attributes(&mut buf, &constant_pool, options)?;

        if !buf.is_empty() {
            return Err(ClassFileError::TrailingBytes(buf.remaining()));
        }

        let class = JavaClass {
            minor_version,
            major_version,
            constant_pool,
            access,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        };
        tracing::trace!(
            name = ?class.class_name().ok(),
            fields = class.fields.len(),
            methods = class.methods.len(),
            "parsed class"
        );
        Ok(class)
    }

    pub fn to_bytes(&self) -> ClassFileResult<Vec<u8>> {
        let mut w = ClassWriter::new();
        self.write(&mut w)?;
        tracing::trace!(len = w.len(), "wrote class");
        Ok(w.into_bytes())
    }

    /// Serializes the class into `out`. Nothing is written if serialization fails.
    pub fn write_to(&self, mut out: impl Write) -> ClassFileResult<()> {
        let bytes = self.to_bytes()?;
        out.write_all(&bytes)?;
        Ok(())
    }

    fn write(&self, w: &mut ClassWriter) -> ClassFileResult<()> {
        let pool = &self.constant_pool;
        w.write_u32(MAGIC);
        w.write_u16(self.minor_version);
        w.write_u16(self.major_version);
        pool.write(w)?;
        w.write_u16(self.access.bits());
        w.write_u16(self.this_class);
        w.write_u16(self.super_class);
        w.write_vec("interfaces", &self.interfaces, |w, index| {
            w.write_u16(*index);
            Ok(())
        })?;
        w.write_vec("fields", &self.fields, |w, field| field.write(w, pool))?;
        w.write_vec("methods", &self.methods, |w, method| method.write(w, pool))?;
        write_attributes(w, &self.attributes, pool)
    }

    pub fn class_name(&self) -> ClassFileResult<&JavaStr> {
        self.constant_pool.class_name(self.this_class)
    }

    pub fn super_class_name(&self) -> ClassFileResult<Option<&JavaStr>> {
        self.constant_pool.optional_class_name(self.super_class)
    }

    pub fn interface_names(&self) -> ClassFileResult<Vec<&JavaStr>> {
        self.interfaces
            .iter()
            .map(|&index| self.constant_pool.class_name(index))
            .collect()
    }

    pub fn is_interface(&self) -> bool {
        self.access.contains(ClassAccess::Interface)
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        let name = JavaStr::from_str(name);
        self.fields
            .iter()
            .find(|field| field.name(&self.constant_pool).is_ok_and(|n| n == name))
    }

    /// The first method with the given name and, if given, descriptor.
    pub fn method(&self, name: &str, descriptor: Option<&str>) -> Option<&MethodInfo> {
        let pool = &self.constant_pool;
        let name = JavaStr::from_str(name);
        self.methods.iter().find(|method| {
            method.name(pool).is_ok_and(|n| n == name)
                && descriptor.map_or(true, |descriptor| {
                    method
                        .descriptor(pool)
                        .is_ok_and(|d| d == JavaStr::from_str(descriptor))
                })
        })
    }

    pub fn source_file(&self) -> ClassFileResult<Option<&JavaStr>> {
        find_attribute(&self.attributes, AttributeInfo::as_source_file)
            .map(|SourceFile { sourcefile_index }| self.constant_pool.get_utf8(*sourcefile_index))
            .transpose()
    }

    pub fn signature(&self) -> Option<&Signature> {
        find_attribute(&self.attributes, AttributeInfo::as_signature)
    }

    pub fn bootstrap_methods(&self) -> Option<&BootstrapMethods> {
        find_attribute(&self.attributes, AttributeInfo::as_bootstrap_methods)
    }

    pub fn inner_classes(&self) -> Option<&InnerClasses> {
        find_attribute(&self.attributes, AttributeInfo::as_inner_classes)
    }

    pub fn enclosing_method(&self) -> Option<&EnclosingMethod> {
        find_attribute(&self.attributes, AttributeInfo::as_enclosing_method)
    }

    pub fn record(&self) -> Option<&Record> {
        find_attribute(&self.attributes, AttributeInfo::as_record)
    }

    pub fn permitted_subclasses(&self) -> Option<&PermittedSubclasses> {
        find_attribute(&self.attributes, AttributeInfo::as_permitted_subclasses)
    }

    pub fn nest_host(&self) -> Option<&NestHost> {
        find_attribute(&self.attributes, AttributeInfo::as_nest_host)
    }

    pub fn nest_members(&self) -> Option<&NestMembers> {
        find_attribute(&self.attributes, AttributeInfo::as_nest_members)
    }

    pub fn module(&self) -> Option<&Module> {
        find_attribute(&self.attributes, AttributeInfo::as_module)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use crate::attribute::Composite;
    use crate::{
        AttributeInfo, ClassAccess, ClassFileError, Constant, ElementValue, ErrorKind, JavaClass,
        ReadOptions, Utf8Cache, LATEST_MAJOR_VERSION,
    };
    use std::sync::Arc;

    pub(crate) const KITCHEN: &[u8] = include_bytes!("../test_data/fixtures/Kitchen.class");

    pub(crate) const FIXTURES: &[(&str, &[u8])] = &[
        ("Kitchen", KITCHEN),
        ("Kitchen$1", include_bytes!("../test_data/fixtures/Kitchen$1.class")),
        (
            "Kitchen$Circle",
            include_bytes!("../test_data/fixtures/Kitchen$Circle.class"),
        ),
        (
            "Kitchen$Hidden",
            include_bytes!("../test_data/fixtures/Kitchen$Hidden.class"),
        ),
        (
            "Kitchen$Inner",
            include_bytes!("../test_data/fixtures/Kitchen$Inner.class"),
        ),
        (
            "Kitchen$Marker",
            include_bytes!("../test_data/fixtures/Kitchen$Marker.class"),
        ),
        (
            "Kitchen$Member",
            include_bytes!("../test_data/fixtures/Kitchen$Member.class"),
        ),
        (
            "Kitchen$Shape",
            include_bytes!("../test_data/fixtures/Kitchen$Shape.class"),
        ),
        (
            "Kitchen$Square",
            include_bytes!("../test_data/fixtures/Kitchen$Square.class"),
        ),
        ("module-info", include_bytes!("../test_data/module-info.class")),
    ];

    fn parse(name: &str) -> JavaClass {
        let (_, bytes) = FIXTURES
            .iter()
            .find(|(fixture, _)| *fixture == name)
            .unwrap();
        JavaClass::parse(bytes).unwrap()
    }

    fn str_eq(expected: &str, actual: &java_string::JavaStr) {
        assert_eq!(expected, actual.as_str().unwrap());
    }

    #[test]
    fn test_round_trip_fixtures() {
        for (name, bytes) in FIXTURES {
            let class = JavaClass::parse(bytes).unwrap();
            assert_eq!(*bytes, class.to_bytes().unwrap().as_slice(), "{name}");
        }
    }

    #[test]
    fn test_round_trip_after_clone_and_write_to() {
        let class = parse("Kitchen").clone();
        let mut out = Vec::new();
        class.write_to(&mut out).unwrap();
        assert_eq!(KITCHEN, out.as_slice());
        assert_eq!(class, JavaClass::parse(&out).unwrap());
    }

    #[test]
    fn test_class_accessors() {
        let class = parse("Kitchen");
        str_eq("fixtures/Kitchen", class.class_name().unwrap());
        str_eq("java/lang/Object", class.super_class_name().unwrap().unwrap());
        let interfaces = class.interface_names().unwrap();
        assert_eq!(2, interfaces.len());
        str_eq("java/lang/Runnable", interfaces[0]);
        str_eq("java/lang/Cloneable", interfaces[1]);
        assert_eq!(61, class.major_version);
        assert!(class.access.contains(ClassAccess::Public));
        assert!(!class.is_interface());
        str_eq("Kitchen.java", class.source_file().unwrap().unwrap());
        assert!(class.signature().is_some());
        assert!(class.bootstrap_methods().is_some());
        assert!(class.inner_classes().unwrap().classes.len() >= 7);
        assert!(class.nest_members().is_some());
    }

    #[test]
    fn test_field_and_method_accessors() {
        let class = parse("Kitchen");
        let pool = &class.constant_pool;

        let big = class.field("BIG").unwrap();
        let index = big.constant_value().unwrap().constantvalue_index;
        assert_eq!(1234567890123, pool.get_i64(index).unwrap());
        let name = class.field("NAME").unwrap();
        str_eq(
            "kitchen",
            pool.string_value(name.constant_value().unwrap().constantvalue_index)
                .unwrap(),
        );
        assert!(class.field("items").unwrap().is_deprecated());

        let looping = class.method("loop", None).unwrap();
        str_eq("(ILjava/lang/String;)I", looping.descriptor(pool).unwrap());
        let exceptions = looping.exception_names(pool).unwrap();
        str_eq("java/io/IOException", exceptions[0]);
        str_eq("java/lang/InterruptedException", exceptions[1]);
        assert_eq!(2, looping.method_parameters().unwrap().parameters.len());
        assert!(looping.runtime_visible_parameter_annotations().is_some());

        let code = looping.code().unwrap();
        assert_eq!(code.calculate_length(), code.length() as usize);
        assert!(!code.exception_table().is_empty());
        assert!(code.line_number_table().is_some());
        assert!(code.local_variable_table().is_some());
        assert!(code.stack_map_table().is_some());
        assert!(class.method("loop", Some("()V")).is_none());
    }

    #[test]
    fn test_annotations_and_defaults() {
        let marker = parse("Kitchen$Marker");
        let pool = &marker.constant_pool;
        let default = marker
            .method("c", None)
            .unwrap()
            .annotation_default()
            .unwrap();
        assert_eq!("'x'", default.default_value.display(pool).to_string());
        let default = marker.method("z", None).unwrap().annotation_default().unwrap();
        assert_eq!("true", default.default_value.display(pool).to_string());

        let kitchen = parse("Kitchen");
        let pool = &kitchen.constant_pool;
        let visible = kitchen
            .attributes
            .iter()
            .find_map(|attribute| attribute.info.as_runtime_visible_annotations())
            .unwrap();
        let annotation = &visible.annotations[0];
        str_eq("Lfixtures/Kitchen$Marker;", annotation.type_descriptor(pool).unwrap());
        let names = annotation.element(pool, "names").unwrap();
        assert_eq!("[\"a\",\"b\"]", names.display(pool).to_string());
        match annotation.element(pool, "nested").unwrap() {
            ElementValue::Annotation(nested) => assert_eq!(
                "[1,2,3]",
                nested.element(pool, "values").unwrap().display(pool).to_string()
            ),
            other => panic!("unexpected {other:?}"),
        }
        assert!(kitchen
            .attributes
            .iter()
            .any(|attribute| attribute.info.is_runtime_invisible_annotations()));
    }

    #[test]
    fn test_records_and_sealed_classes() {
        let square = parse("Kitchen$Square");
        let record = square.record().unwrap();
        assert_eq!(1, record.components().len());
        assert_eq!(record.calculate_length(), record.length() as usize);
        str_eq(
            "side",
            record.components()[0].name(&square.constant_pool).unwrap(),
        );
        assert!(square.nest_host().is_some());

        let shape = parse("Kitchen$Shape");
        assert!(shape.is_interface());
        assert_eq!(2, shape.permitted_subclasses().unwrap().classes().len());

        let anonymous = parse("Kitchen$1");
        assert!(anonymous.enclosing_method().is_some());
    }

    #[test]
    fn test_module_info() {
        let class = parse("module-info");
        let pool = &class.constant_pool;
        assert!(class.access.contains(ClassAccess::Module));
        assert_eq!(None, class.super_class_name().unwrap());
        let module = class.module().unwrap();
        str_eq("com.example.app", module.name(pool).unwrap());
        assert_eq!(1, module.exports.len());
        assert_eq!(1, module.opens[0].to_indices.len());
        assert_eq!(1, module.uses_index.len());
        assert_eq!(1, module.provides.len());
        assert!(class
            .attributes
            .iter()
            .any(|attribute| attribute.info.is_module_packages()));
        assert!(class
            .attributes
            .iter()
            .any(|attribute| attribute.info.is_module_main_class()));
    }

    #[test]
    fn test_mutation_recomputes_lengths() {
        let mut class = parse("Kitchen");
        let before = class.to_bytes().unwrap().len();
        let method = class
            .methods
            .iter_mut()
            .find(|method| method.code().is_some_and(|code| !code.attributes().is_empty()))
            .unwrap();
        let code = method.code_mut().unwrap();
        let removed = code.attributes_mut().pop().unwrap();
        let removed_len = 6 + removed.length() as usize;

        let bytes = class.to_bytes().unwrap();
        assert_eq!(before - removed_len, bytes.len());
        assert_eq!(class, JavaClass::parse(&bytes).unwrap());
    }

    #[test]
    fn test_unknown_class_attribute_survives() {
        let mut class = parse("Kitchen");
        let attribute =
            crate::Attribute::unknown(&mut class.constant_pool, "VendorExt", vec![1, 2, 3])
                .unwrap();
        class.attributes.push(attribute);
        let bytes = class.to_bytes().unwrap();
        assert_eq!(&[1, 2, 3], &bytes[bytes.len() - 3..]);

        let reread = JavaClass::parse(&bytes).unwrap();
        let unknown = reread.attributes.last().unwrap();
        str_eq("VendorExt", unknown.name(&reread.constant_pool).unwrap());
        assert_eq!(
            Some(&[1u8, 2, 3][..]),
            unknown.info.as_unknown().map(|unknown| unknown.data.as_slice())
        );
        assert_eq!(bytes, reread.to_bytes().unwrap());

        let mut unnamed = bytes.clone();
        let header = unnamed.len() - 9;
        unnamed[header] = 0;
        unnamed[header + 1] = 0;
        let err = JavaClass::parse(&unnamed).unwrap_err();
        assert!(matches!(err, ClassFileError::BadAttributeName { index: 0 }));
        assert_eq!(ErrorKind::StructuralFormat, err.kind());
    }

    #[test]
    fn test_structural_errors() {
        let mut bad_magic = KITCHEN.to_vec();
        bad_magic[0] = 0;
        assert!(matches!(
            JavaClass::parse(&bad_magic),
            Err(ClassFileError::BadMagic(0x00febabe))
        ));

        let truncated = &KITCHEN[..KITCHEN.len() - 1];
        let err = JavaClass::parse(truncated).unwrap_err();
        assert_eq!(ErrorKind::StructuralFormat, err.kind());

        let mut trailing = KITCHEN.to_vec();
        trailing.push(0);
        assert!(matches!(
            JavaClass::parse(&trailing),
            Err(ClassFileError::TrailingBytes(1))
        ));

        let options = ReadOptions::default().with_max_major_version(52);
        let err = JavaClass::parse_with(KITCHEN, &options).unwrap_err();
        assert!(matches!(err, ClassFileError::UnsupportedVersion(61)));
        assert_eq!(ErrorKind::ResourceLimit, err.kind());
        let options = ReadOptions::default().with_max_major_version(LATEST_MAJOR_VERSION);
        assert!(JavaClass::parse_with(KITCHEN, &options).is_ok());
    }

    #[test]
    fn test_shared_utf8_cache() {
        let cache = Arc::new(Utf8Cache::new(4096));
        let options = ReadOptions::default().with_utf8_cache(cache.clone());
        let first = JavaClass::parse_with(KITCHEN, &options).unwrap();
        let misses = cache.stats().misses;
        let second = JavaClass::parse_with(KITCHEN, &options).unwrap();
        assert_eq!(misses, cache.stats().misses);
        assert!(cache.stats().hits >= misses);
        assert_eq!(first, second);

        let utf8 = |class: &JavaClass| match class.constant_pool.get(1).unwrap() {
            Constant::Utf8(value) => Some(value.clone()),
            _ => None,
        };
        if let (Some(a), Some(b)) = (utf8(&first), utf8(&second)) {
            assert!(Arc::ptr_eq(&a, &b));
        }
        assert!(!first.methods.is_empty());
        assert!(first.attributes.iter().all(|a| !matches!(a.info, AttributeInfo::Unknown(_))));
    }
}
