pub const MAGIC: u32 = 0xcafebabe;

/// Java 25.
pub const LATEST_MAJOR_VERSION: u16 = 69;

pub const ANNOTATION_DEFAULT: &str = "AnnotationDefault";
pub const BOOTSTRAP_METHODS: &str = "BootstrapMethods";
pub const CODE: &str = "Code";
pub const CONSTANT_VALUE: &str = "ConstantValue";
pub const DEPRECATED: &str = "Deprecated";
pub const ENCLOSING_METHOD: &str = "EnclosingMethod";
pub const EXCEPTIONS: &str = "Exceptions";
pub const INNER_CLASSES: &str = "InnerClasses";
pub const LINE_NUMBER_TABLE: &str = "LineNumberTable";
pub const LOCAL_VARIABLE_TABLE: &str = "LocalVariableTable";
pub const LOCAL_VARIABLE_TYPE_TABLE: &str = "LocalVariableTypeTable";
pub const METHOD_PARAMETERS: &str = "MethodParameters";
pub const MODULE: &str = "Module";
pub const MODULE_MAIN_CLASS: &str = "ModuleMainClass";
pub const MODULE_PACKAGES: &str = "ModulePackages";
pub const NEST_HOST: &str = "NestHost";
pub const NEST_MEMBERS: &str = "NestMembers";
pub const PERMITTED_SUBCLASSES: &str = "PermittedSubclasses";
pub const RECORD: &str = "Record";
pub const RUNTIME_INVISIBLE_ANNOTATIONS: &str = "RuntimeInvisibleAnnotations";
pub const RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS: &str = "RuntimeInvisibleParameterAnnotations";
pub const RUNTIME_VISIBLE_ANNOTATIONS: &str = "RuntimeVisibleAnnotations";
pub const RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS: &str = "RuntimeVisibleParameterAnnotations";
pub const SIGNATURE: &str = "Signature";
pub const SOURCE_DEBUG_EXTENSION: &str = "SourceDebugExtension";
pub const SOURCE_FILE: &str = "SourceFile";
/// Pre-Java 6 CLDC attribute, superseded by [`STACK_MAP_TABLE`].
pub const STACK_MAP: &str = "StackMap";
pub const STACK_MAP_TABLE: &str = "StackMapTable";
pub const SYNTHETIC: &str = "Synthetic";
