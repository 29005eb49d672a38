use crate::{
    AnnotationDefault, AnnotationEntry, Annotations, Attribute, AttributeInfo, BootstrapMethod,
    BootstrapMethods, Code, Constant, ConstantPool, ConstantValue, Deprecated, ElementValue,
    EnclosingMethod, ExceptionTableEntry, Exceptions, FieldInfo, InnerClass, InnerClasses,
    JavaClass, LineNumber, LineNumberTable, LocalVariable, LocalVariableTable,
    LocalVariableTypeTable, MethodInfo, MethodParameters, Module, ModuleMainClass,
    ModulePackages, NestHost, NestMembers, ParameterAnnotations, PermittedSubclasses, Record,
    RecordComponent, Signature, SourceDebugExtension, SourceFile, StackMapFrame, StackMapTable,
    Synthetic, UnknownAttribute,
};

/// Callbacks for a depth-first walk over a class, started with [`JavaClass::accept`].
///
/// Every method defaults to doing nothing. Parents are visited before their children:
/// the class, then the constant pool and each constant, then the class attributes, then each
/// field and its attributes, then each method and its attributes. Attributes with children
/// (`Code`, `Record`, annotations and the tables) are followed by their entries.
#[allow(unused_variables)]
pub trait Visitor {
    fn visit_class(&mut self, class: &JavaClass) {}
    fn visit_constant_pool(&mut self, pool: &ConstantPool) {}
    fn visit_constant(&mut self, index: u16, constant: &Constant) {}
    fn visit_field(&mut self, field: &FieldInfo) {}
    fn visit_method(&mut self, method: &MethodInfo) {}

    /// Called for every attribute before the kind-specific callback.
    fn visit_attribute(&mut self, attribute: &Attribute) {}
    fn visit_source_file(&mut self, source_file: &SourceFile) {}
    fn visit_constant_value(&mut self, constant_value: &ConstantValue) {}
    fn visit_exceptions(&mut self, exceptions: &Exceptions) {}
    fn visit_synthetic(&mut self, synthetic: &Synthetic) {}
    fn visit_deprecated(&mut self, deprecated: &Deprecated) {}
    fn visit_signature(&mut self, signature: &Signature) {}
    fn visit_source_debug_extension(&mut self, extension: &SourceDebugExtension) {}
    fn visit_enclosing_method(&mut self, enclosing_method: &EnclosingMethod) {}
    fn visit_nest_host(&mut self, nest_host: &NestHost) {}
    fn visit_nest_members(&mut self, nest_members: &NestMembers) {}
    fn visit_permitted_subclasses(&mut self, permitted: &PermittedSubclasses) {}
    fn visit_code(&mut self, code: &Code) {}
    fn visit_exception_table_entry(&mut self, entry: &ExceptionTableEntry) {}
    fn visit_line_number_table(&mut self, table: &LineNumberTable) {}
    fn visit_line_number(&mut self, line: &LineNumber) {}
    fn visit_local_variable_table(&mut self, table: &LocalVariableTable) {}
    fn visit_local_variable_type_table(&mut self, table: &LocalVariableTypeTable) {}
    fn visit_local_variable(&mut self, local: &LocalVariable) {}
    fn visit_stack_map_table(&mut self, table: &StackMapTable) {}
    fn visit_stack_map_frame(&mut self, frame: &StackMapFrame) {}
    fn visit_inner_classes(&mut self, inner_classes: &InnerClasses) {}
    fn visit_inner_class(&mut self, inner_class: &InnerClass) {}
    fn visit_bootstrap_methods(&mut self, methods: &BootstrapMethods) {}
    fn visit_bootstrap_method(&mut self, method: &BootstrapMethod) {}
    fn visit_method_parameters(&mut self, parameters: &MethodParameters) {}
    fn visit_record(&mut self, record: &Record) {}
    fn visit_record_component(&mut self, component: &RecordComponent) {}
    fn visit_module(&mut self, module: &Module) {}
    fn visit_module_packages(&mut self, packages: &ModulePackages) {}
    fn visit_module_main_class(&mut self, main_class: &ModuleMainClass) {}

    /// Called for both visible and invisible annotation attributes.
    fn visit_annotations(&mut self, annotations: &Annotations, visible: bool) {}
    fn visit_parameter_annotations(&mut self, annotations: &ParameterAnnotations, visible: bool) {}
    fn visit_annotation_default(&mut self, default: &AnnotationDefault) {}
    fn visit_annotation(&mut self, annotation: &AnnotationEntry) {}
    fn visit_element_value(&mut self, value: &ElementValue) {}

    /// Called for attributes kept as raw bytes.
    fn visit_unknown(&mut self, attribute: &UnknownAttribute) {}
}

impl JavaClass {
    pub fn accept(&self, visitor: &mut impl Visitor) {
        visitor.visit_class(self);
        visitor.visit_constant_pool(&self.constant_pool);
        for (index, constant) in self.constant_pool.iter() {
            visitor.visit_constant(index, constant);
        }
        walk_attributes(&self.attributes, visitor);
        for field in &self.fields {
            field.accept(visitor);
        }
        for method in &self.methods {
            method.accept(visitor);
        }
    }
}

impl FieldInfo {
    pub fn accept(&self, visitor: &mut impl Visitor) {
        visitor.visit_field(self);
        walk_attributes(&self.attributes, visitor);
    }
}

impl MethodInfo {
    pub fn accept(&self, visitor: &mut impl Visitor) {
        visitor.visit_method(self);
        walk_attributes(&self.attributes, visitor);
    }
}

fn walk_attributes(attributes: &[Attribute], visitor: &mut impl Visitor) {
    for attribute in attributes {
        attribute.accept(visitor);
    }
}

fn walk_annotation_list(annotations: &[AnnotationEntry], visitor: &mut impl Visitor) {
    for annotation in annotations {
        annotation.accept(visitor);
    }
}

impl Attribute {
    /// Visits this attribute, then whatever it contains.
    pub fn accept(&self, visitor: &mut impl Visitor) {
        visitor.visit_attribute(self);
        match &self.info {
            AttributeInfo::Code(code) => {
                visitor.visit_code(code);
                for entry in code.exception_table() {
                    visitor.visit_exception_table_entry(entry);
                }
                walk_attributes(code.attributes(), visitor);
            }
            AttributeInfo::LineNumberTable(table) => {
                visitor.visit_line_number_table(table);
                for line in &table.line_numbers {
                    visitor.visit_line_number(line);
                }
            }
            AttributeInfo::LocalVariableTable(table) => {
                visitor.visit_local_variable_table(table);
                for local in &table.local_variables {
                    visitor.visit_local_variable(local);
                }
            }
            AttributeInfo::LocalVariableTypeTable(table) => {
                visitor.visit_local_variable_type_table(table);
                for local in &table.local_variable_types {
                    visitor.visit_local_variable(local);
                }
            }
            AttributeInfo::StackMapTable(table) => {
                visitor.visit_stack_map_table(table);
                for frame in table.entries() {
                    visitor.visit_stack_map_frame(frame);
                }
            }
            AttributeInfo::InnerClasses(inner_classes) => {
                visitor.visit_inner_classes(inner_classes);
                for inner_class in &inner_classes.classes {
                    visitor.visit_inner_class(inner_class);
                }
            }
            AttributeInfo::BootstrapMethods(methods) => {
                visitor.visit_bootstrap_methods(methods);
                for method in methods.methods() {
                    visitor.visit_bootstrap_method(method);
                }
            }
            AttributeInfo::MethodParameters(parameters) => {
                visitor.visit_method_parameters(parameters)
            }
            AttributeInfo::Record(record) => {
                visitor.visit_record(record);
                for component in record.components() {
                    visitor.visit_record_component(component);
                    walk_attributes(&component.attributes, visitor);
                }
            }
            AttributeInfo::Module(module) => visitor.visit_module(module),
            AttributeInfo::RuntimeVisibleAnnotations(annotations) => {
                visitor.visit_annotations(annotations, true);
                walk_annotation_list(&annotations.annotations, visitor);
            }
            AttributeInfo::RuntimeInvisibleAnnotations(annotations) => {
                visitor.visit_annotations(annotations, false);
                walk_annotation_list(&annotations.annotations, visitor);
            }
            AttributeInfo::RuntimeVisibleParameterAnnotations(annotations) => {
                visitor.visit_parameter_annotations(annotations, true);
                for parameter in &annotations.parameters {
                    walk_annotation_list(parameter, visitor);
                }
            }
            AttributeInfo::RuntimeInvisibleParameterAnnotations(annotations) => {
                visitor.visit_parameter_annotations(annotations, false);
                for parameter in &annotations.parameters {
                    walk_annotation_list(parameter, visitor);
                }
            }
            AttributeInfo::AnnotationDefault(default) => {
                visitor.visit_annotation_default(default);
                default.default_value.accept(visitor);
            }
            AttributeInfo::Unknown(unknown) => visitor.visit_unknown(unknown),
            AttributeInfo::SourceFile(source_file) => visitor.visit_source_file(source_file),
            AttributeInfo::ConstantValue(value) => visitor.visit_constant_value(value),
            AttributeInfo::Exceptions(exceptions) => visitor.visit_exceptions(exceptions),
            AttributeInfo::Synthetic(synthetic) => visitor.visit_synthetic(synthetic),
            AttributeInfo::Deprecated(deprecated) => visitor.visit_deprecated(deprecated),
            AttributeInfo::Signature(signature) => visitor.visit_signature(signature),
            AttributeInfo::ModulePackages(packages) => visitor.visit_module_packages(packages),
            AttributeInfo::ModuleMainClass(main_class) => {
                visitor.visit_module_main_class(main_class)
            }
            AttributeInfo::PermittedSubclasses(permitted) => {
                visitor.visit_permitted_subclasses(permitted)
            }
            AttributeInfo::NestHost(nest_host) => visitor.visit_nest_host(nest_host),
            AttributeInfo::NestMembers(nest_members) => visitor.visit_nest_members(nest_members),
            AttributeInfo::EnclosingMethod(enclosing_method) => {
                visitor.visit_enclosing_method(enclosing_method)
            }
            AttributeInfo::SourceDebugExtension(extension) => {
                visitor.visit_source_debug_extension(extension)
            }
        }
    }
}

impl AnnotationEntry {
    pub fn accept(&self, visitor: &mut impl Visitor) {
        visitor.visit_annotation(self);
        for pair in &self.element_value_pairs {
            pair.value.accept(visitor);
        }
    }
}

impl ElementValue {
    pub fn accept(&self, visitor: &mut impl Visitor) {
        visitor.visit_element_value(self);
        match self {
            ElementValue::Annotation(annotation) => annotation.accept(visitor),
            ElementValue::Array(values) => {
                for value in values {
                    value.accept(visitor);
                }
            }
            _ => {}
        }
    }
}
