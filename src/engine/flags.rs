//! Reflection flag domains
//!
//! Each flag domain is declared once, as an ordered table of
//! `(constant, bit, display name)` rows. The table expands into a
//! [`bitflags`] type for the set algebra and into the [`FlagDomain::NAMED`]
//! slice that drives stringification, so declaration order, membership and
//! naming cannot drift apart.
//!
//! Domains are distinct types: a [`FunctionFlags`] word can never be tested
//! against a [`PropertyFlags`] constant. Bits a domain does not name are kept
//! in the value (see [`FlagDomain::from_raw`]) but never stringified, so a
//! stringified mask is not a serialization format.

use bitflags::bitflags;
use std::fmt;

/// Behaviour shared by every flag domain
pub trait FlagDomain: Copy + Eq + fmt::Debug + 'static {
    /// Name of the domain, e.g. `"FunctionFlags"`
    const DOMAIN: &'static str;

    /// Named flags in canonical declaration order
    const NAMED: &'static [(Self, &'static str)];

    /// The empty mask
    fn none() -> Self;

    /// Wrap a raw flag word read from target memory, keeping unknown bits
    fn from_raw(bits: u64) -> Self;

    /// The raw flag word, unknown bits included
    fn raw(self) -> u64;

    /// Whether every bit of `flag` is set in `self`
    fn test(self, flag: Self) -> bool;

    /// Bitwise OR of two masks
    fn union(self, other: Self) -> Self;

    /// Bits set in `self` that no named flag of this domain covers
    fn unknown_bits(self) -> u64;

    /// Names of the matched flags, in declaration order
    fn matched_names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMED
            .iter()
            .filter(move |(flag, _)| self.test(*flag))
            .map(|(_, name)| *name)
    }

    /// Matched flag names joined by `separator`; empty when nothing named is set
    fn stringify(self, separator: &str) -> String {
        let mut out = String::new();

        for (i, name) in self.matched_names().enumerate() {
            if i > 0 {
                out.push_str(separator);
            }
            out.push_str(name);
        }

        out
    }
}

macro_rules! flag_domain {
    (
        $(#[$outer:meta])*
        pub struct $name:ident: $bits:ty {
            $(
                const $flag:ident = $value:expr => $display:literal;
            )*
        }
    ) => {
        bitflags! {
            $(#[$outer])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
            pub struct $name: $bits {
                $(
                    #[doc = $display]
                    const $flag = $value;
                )*
            }
        }

        impl FlagDomain for $name {
            const DOMAIN: &'static str = stringify!($name);
            const NAMED: &'static [(Self, &'static str)] = &[$((Self::$flag, $display)),*];

            #[inline]
            fn none() -> Self {
                Self::empty()
            }

            #[inline]
            fn from_raw(bits: u64) -> Self {
                Self::from_bits_retain(bits as $bits)
            }

            #[inline]
            fn raw(self) -> u64 {
                self.bits() as u64
            }

            #[inline]
            fn test(self, flag: Self) -> bool {
                !flag.is_empty() && self.contains(flag)
            }

            #[inline]
            fn union(self, other: Self) -> Self {
                self | other
            }

            #[inline]
            fn unknown_bits(self) -> u64 {
                (self.bits() & !Self::all().bits()) as u64
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.stringify(", "))
            }
        }
    };
}

flag_domain! {
    /// `EPropertyFlags`: per-property flags (`FProperty::PropertyFlags`)
    pub struct PropertyFlags: u64 {
        const EDIT = 0x0000_0000_0000_0001 => "Edit";
        const CONST_PARM = 0x0000_0000_0000_0002 => "ConstParm";
        const BLUEPRINT_VISIBLE = 0x0000_0000_0000_0004 => "BlueprintVisible";
        const EXPORT_OBJECT = 0x0000_0000_0000_0008 => "ExportObject";
        const BLUEPRINT_READ_ONLY = 0x0000_0000_0000_0010 => "BlueprintReadOnly";
        const NET = 0x0000_0000_0000_0020 => "Net";
        const EDIT_FIXED_SIZE = 0x0000_0000_0000_0040 => "EditFixedSize";
        const PARM = 0x0000_0000_0000_0080 => "Parm";
        const OUT_PARM = 0x0000_0000_0000_0100 => "OutParm";
        const ZERO_CONSTRUCTOR = 0x0000_0000_0000_0200 => "ZeroConstructor";
        const RETURN_PARM = 0x0000_0000_0000_0400 => "ReturnParm";
        const DISABLE_EDIT_ON_TEMPLATE = 0x0000_0000_0000_0800 => "DisableEditOnTemplate";
        const TRANSIENT = 0x0000_0000_0000_2000 => "Transient";
        const CONFIG = 0x0000_0000_0000_4000 => "Config";
        const DISABLE_EDIT_ON_INSTANCE = 0x0000_0000_0001_0000 => "DisableEditOnInstance";
        const EDIT_CONST = 0x0000_0000_0002_0000 => "EditConst";
        const GLOBAL_CONFIG = 0x0000_0000_0004_0000 => "GlobalConfig";
        const INSTANCED_REFERENCE = 0x0000_0000_0008_0000 => "InstancedReference";
        const DUPLICATE_TRANSIENT = 0x0000_0000_0020_0000 => "DuplicateTransient";
        const SUBOBJECT_REFERENCE = 0x0000_0000_0040_0000 => "SubobjectReference";
        const SAVE_GAME = 0x0000_0000_0100_0000 => "SaveGame";
        const NO_CLEAR = 0x0000_0000_0200_0000 => "NoClear";
        const REFERENCE_PARM = 0x0000_0000_0800_0000 => "ReferenceParm";
        const BLUEPRINT_ASSIGNABLE = 0x0000_0000_1000_0000 => "BlueprintAssignable";
        const DEPRECATED = 0x0000_0000_2000_0000 => "Deprecated";
        const IS_PLAIN_OLD_DATA = 0x0000_0000_4000_0000 => "IsPlainOldData";
        const REP_SKIP = 0x0000_0000_8000_0000 => "RepSkip";
        const REP_NOTIFY = 0x0000_0001_0000_0000 => "RepNotify";
        const INTERP = 0x0000_0002_0000_0000 => "Interp";
        const NON_TRANSACTIONAL = 0x0000_0004_0000_0000 => "NonTransactional";
        const EDITOR_ONLY = 0x0000_0008_0000_0000 => "EditorOnly";
        const NO_DESTRUCTOR = 0x0000_0010_0000_0000 => "NoDestructor";
        const AUTO_WEAK = 0x0000_0040_0000_0000 => "AutoWeak";
        const CONTAINS_INSTANCED_REFERENCE = 0x0000_0080_0000_0000 => "ContainsInstancedReference";
        const ASSET_REGISTRY_SEARCHABLE = 0x0000_0100_0000_0000 => "AssetRegistrySearchable";
        const SIMPLE_DISPLAY = 0x0000_0200_0000_0000 => "SimpleDisplay";
        const ADVANCED_DISPLAY = 0x0000_0400_0000_0000 => "AdvancedDisplay";
        const PROTECTED = 0x0000_0800_0000_0000 => "Protected";
        const BLUEPRINT_CALLABLE = 0x0000_1000_0000_0000 => "BlueprintCallable";
        const BLUEPRINT_AUTHORITY_ONLY = 0x0000_2000_0000_0000 => "BlueprintAuthorityOnly";
        const TEXT_EXPORT_TRANSIENT = 0x0000_4000_0000_0000 => "TextExportTransient";
        const NON_PIE_DUPLICATE_TRANSIENT = 0x0000_8000_0000_0000 => "NonPIEDuplicateTransient";
        const EXPOSE_ON_SPAWN = 0x0001_0000_0000_0000 => "ExposeOnSpawn";
        const PERSISTENT_INSTANCE = 0x0002_0000_0000_0000 => "PersistentInstance";
        const UOBJECT_WRAPPER = 0x0004_0000_0000_0000 => "UObjectWrapper";
        const HAS_GET_VALUE_TYPE_HASH = 0x0008_0000_0000_0000 => "HasGetValueTypeHash";
        const NATIVE_ACCESS_SPECIFIER_PUBLIC = 0x0010_0000_0000_0000 => "NativeAccessSpecifierPublic";
        const NATIVE_ACCESS_SPECIFIER_PROTECTED = 0x0020_0000_0000_0000 => "NativeAccessSpecifierProtected";
        const NATIVE_ACCESS_SPECIFIER_PRIVATE = 0x0040_0000_0000_0000 => "NativeAccessSpecifierPrivate";
        const SKIP_SERIALIZATION = 0x0080_0000_0000_0000 => "SkipSerialization";
    }
}

flag_domain! {
    /// `EFunctionFlags`: per-function flags (`UFunction::FunctionFlags`)
    pub struct FunctionFlags: u32 {
        const FINAL = 0x0000_0001 => "Final";
        const REQUIRED_API = 0x0000_0002 => "RequiredAPI";
        const BLUEPRINT_AUTHORITY_ONLY = 0x0000_0004 => "BlueprintAuthorityOnly";
        const BLUEPRINT_COSMETIC = 0x0000_0008 => "BlueprintCosmetic";
        const NET = 0x0000_0040 => "Net";
        const NET_RELIABLE = 0x0000_0080 => "NetReliable";
        const NET_REQUEST = 0x0000_0100 => "NetRequest";
        const EXEC = 0x0000_0200 => "Exec";
        const NATIVE = 0x0000_0400 => "Native";
        const EVENT = 0x0000_0800 => "Event";
        const NET_RESPONSE = 0x0000_1000 => "NetResponse";
        const STATIC = 0x0000_2000 => "Static";
        const NET_MULTICAST = 0x0000_4000 => "NetMulticast";
        const UBERGRAPH_FUNCTION = 0x0000_8000 => "UbergraphFunction";
        const MULTICAST_DELEGATE = 0x0001_0000 => "MulticastDelegate";
        const PUBLIC = 0x0002_0000 => "Public";
        const PRIVATE = 0x0004_0000 => "Private";
        const PROTECTED = 0x0008_0000 => "Protected";
        const DELEGATE = 0x0010_0000 => "Delegate";
        const NET_SERVER = 0x0020_0000 => "NetServer";
        const HAS_OUT_PARMS = 0x0040_0000 => "HasOutParams";
        const HAS_DEFAULTS = 0x0080_0000 => "HasDefaults";
        const NET_CLIENT = 0x0100_0000 => "NetClient";
        const DLL_IMPORT = 0x0200_0000 => "DLLImport";
        const BLUEPRINT_CALLABLE = 0x0400_0000 => "BlueprintCallable";
        const BLUEPRINT_EVENT = 0x0800_0000 => "BlueprintEvent";
        const BLUEPRINT_PURE = 0x1000_0000 => "BlueprintPure";
        const EDITOR_ONLY = 0x2000_0000 => "EditorOnly";
        const CONST = 0x4000_0000 => "Const";
        const NET_VALIDATE = 0x8000_0000 => "NetValidate";
    }
}

flag_domain! {
    /// `EObjectFlags`: per-object flags (`UObject::ObjectFlags`)
    pub struct ObjectFlags: u32 {
        const PUBLIC = 0x0000_0001 => "Public";
        const STANDALONE = 0x0000_0002 => "Standalone";
        const MARK_AS_NATIVE = 0x0000_0004 => "MarkAsNative";
        const TRANSACTIONAL = 0x0000_0008 => "Transactional";
        const CLASS_DEFAULT_OBJECT = 0x0000_0010 => "ClassDefaultObject";
        const ARCHETYPE_OBJECT = 0x0000_0020 => "ArchetypeObject";
        const TRANSIENT = 0x0000_0040 => "Transient";
        const MARK_AS_ROOT_SET = 0x0000_0080 => "MarkAsRootSet";
        const TAG_GARBAGE_TEMP = 0x0000_0100 => "TagGarbageTemp";
        const NEED_INITIALIZATION = 0x0000_0200 => "NeedInitialization";
        const NEED_LOAD = 0x0000_0400 => "NeedLoad";
        const KEEP_FOR_COOKER = 0x0000_0800 => "KeepForCooker";
        const NEED_POST_LOAD = 0x0000_1000 => "NeedPostLoad";
        const NEED_POST_LOAD_SUBOBJECTS = 0x0000_2000 => "NeedPostLoadSubobjects";
        const NEWER_VERSION_EXISTS = 0x0000_4000 => "NewerVersionExists";
        const BEGIN_DESTROYED = 0x0000_8000 => "BeginDestroyed";
        const FINISH_DESTROYED = 0x0001_0000 => "FinishDestroyed";
        const BEING_REGENERATED = 0x0002_0000 => "BeingRegenerated";
        const DEFAULT_SUB_OBJECT = 0x0004_0000 => "DefaultSubObject";
        const WAS_LOADED = 0x0008_0000 => "WasLoaded";
        const TEXT_EXPORT_TRANSIENT = 0x0010_0000 => "TextExportTransient";
        const LOAD_COMPLETED = 0x0020_0000 => "LoadCompleted";
        const INHERITABLE_COMPONENT_TEMPLATE = 0x0040_0000 => "InheritableComponentTemplate";
        const DUPLICATE_TRANSIENT = 0x0080_0000 => "DuplicateTransient";
        const STRONG_REF_ON_FRAME = 0x0100_0000 => "StrongRefOnFrame";
        const NON_PIE_DUPLICATE_TRANSIENT = 0x0200_0000 => "NonPIEDuplicateTransient";
        const DYNAMIC = 0x0400_0000 => "Dynamic";
        const WILL_BE_LOADED = 0x0800_0000 => "WillBeLoaded";
    }
}

flag_domain! {
    /// `EClassCastFlags`: one bit per engine class a class can be cast to
    pub struct ClassCastFlags: u64 {
        const FIELD = 0x0000_0000_0000_0001 => "Field";
        const INT8_PROPERTY = 0x0000_0000_0000_0002 => "Int8Property";
        const ENUM = 0x0000_0000_0000_0004 => "Enum";
        const STRUCT = 0x0000_0000_0000_0008 => "Struct";
        const SCRIPT_STRUCT = 0x0000_0000_0000_0010 => "ScriptStruct";
        const CLASS = 0x0000_0000_0000_0020 => "Class";
        const BYTE_PROPERTY = 0x0000_0000_0000_0040 => "ByteProperty";
        const INT_PROPERTY = 0x0000_0000_0000_0080 => "IntProperty";
        const FLOAT_PROPERTY = 0x0000_0000_0000_0100 => "FloatProperty";
        const UINT64_PROPERTY = 0x0000_0000_0000_0200 => "UInt64Property";
        const CLASS_PROPERTY = 0x0000_0000_0000_0400 => "ClassProperty";
        const UINT32_PROPERTY = 0x0000_0000_0000_0800 => "UInt32Property";
        const INTERFACE_PROPERTY = 0x0000_0000_0000_1000 => "InterfaceProperty";
        const NAME_PROPERTY = 0x0000_0000_0000_2000 => "NameProperty";
        const STR_PROPERTY = 0x0000_0000_0000_4000 => "StrProperty";
        const PROPERTY = 0x0000_0000_0000_8000 => "Property";
        const OBJECT_PROPERTY = 0x0000_0000_0001_0000 => "ObjectProperty";
        const BOOL_PROPERTY = 0x0000_0000_0002_0000 => "BoolProperty";
        const UINT16_PROPERTY = 0x0000_0000_0004_0000 => "UInt16Property";
        const FUNCTION = 0x0000_0000_0008_0000 => "Function";
        const STRUCT_PROPERTY = 0x0000_0000_0010_0000 => "StructProperty";
        const ARRAY_PROPERTY = 0x0000_0000_0020_0000 => "ArrayProperty";
        const INT64_PROPERTY = 0x0000_0000_0040_0000 => "Int64Property";
        const DELEGATE_PROPERTY = 0x0000_0000_0080_0000 => "DelegateProperty";
        const NUMERIC_PROPERTY = 0x0000_0000_0100_0000 => "NumericProperty";
        const MULTICAST_DELEGATE_PROPERTY = 0x0000_0000_0200_0000 => "MulticastDelegateProperty";
        const OBJECT_PROPERTY_BASE = 0x0000_0000_0400_0000 => "ObjectPropertyBase";
        const WEAK_OBJECT_PROPERTY = 0x0000_0000_0800_0000 => "WeakObjectProperty";
        const LAZY_OBJECT_PROPERTY = 0x0000_0000_1000_0000 => "LazyObjectProperty";
        const SOFT_OBJECT_PROPERTY = 0x0000_0000_2000_0000 => "SoftObjectProperty";
        const TEXT_PROPERTY = 0x0000_0000_4000_0000 => "TextProperty";
        const INT16_PROPERTY = 0x0000_0000_8000_0000 => "Int16Property";
        const DOUBLE_PROPERTY = 0x0000_0001_0000_0000 => "DoubleProperty";
        const SOFT_CLASS_PROPERTY = 0x0000_0002_0000_0000 => "SoftClassProperty";
        const PACKAGE = 0x0000_0004_0000_0000 => "Package";
        const LEVEL = 0x0000_0008_0000_0000 => "Level";
        const ACTOR = 0x0000_0010_0000_0000 => "Actor";
        const PLAYER_CONTROLLER = 0x0000_0020_0000_0000 => "PlayerController";
        const PAWN = 0x0000_0040_0000_0000 => "Pawn";
        const SCENE_COMPONENT = 0x0000_0080_0000_0000 => "SceneComponent";
        const PRIMITIVE_COMPONENT = 0x0000_0100_0000_0000 => "PrimitiveComponent";
        const SKINNED_MESH_COMPONENT = 0x0000_0200_0000_0000 => "SkinnedMeshComponent";
        const SKELETAL_MESH_COMPONENT = 0x0000_0400_0000_0000 => "SkeletalMeshComponent";
        const BLUEPRINT = 0x0000_0800_0000_0000 => "Blueprint";
        const DELEGATE_FUNCTION = 0x0000_1000_0000_0000 => "DelegateFunction";
        const STATIC_MESH_COMPONENT = 0x0000_2000_0000_0000 => "StaticMeshComponent";
        const MAP_PROPERTY = 0x0000_4000_0000_0000 => "MapProperty";
        const SET_PROPERTY = 0x0000_8000_0000_0000 => "SetProperty";
        const ENUM_PROPERTY = 0x0001_0000_0000_0000 => "EnumProperty";
        const SPARSE_DELEGATE_FUNCTION = 0x0002_0000_0000_0000 => "SparseDelegateFunction";
        const MULTICAST_INLINE_DELEGATE_PROPERTY = 0x0004_0000_0000_0000 => "MulticastInlineDelegateProperty";
        const MULTICAST_SPARSE_DELEGATE_PROPERTY = 0x0008_0000_0000_0000 => "MulticastSparseDelegateProperty";
        const FIELD_PATH_PROPERTY = 0x0010_0000_0000_0000 => "FieldPathProperty";
        const LARGE_WORLD_COORDINATES_REAL_PROPERTY = 0x0080_0000_0000_0000 => "LargeWorldCoordinatesRealProperty";
        const OPTIONAL_PROPERTY = 0x0100_0000_0000_0000 => "OptionalProperty";
        const VVALUE_PROPERTY = 0x0200_0000_0000_0000 => "VValueProperty";
        const VERSE_VM_CLASS = 0x0400_0000_0000_0000 => "VerseVMClass";
        const VREST_VALUE_PROPERTY = 0x0800_0000_0000_0000 => "VRestValueProperty";
    }
}

flag_domain! {
    /// `EClassFlags`: per-class flags (`UClass::ClassFlags`)
    pub struct ClassFlags: u32 {
        const ABSTRACT = 0x0000_0001 => "Abstract";
        const DEFAULT_CONFIG = 0x0000_0002 => "DefaultConfig";
        const CONFIG = 0x0000_0004 => "Config";
        const TRANSIENT = 0x0000_0008 => "Transient";
        const PARSED = 0x0000_0010 => "Parsed";
        const MATCHED_SERIALIZERS = 0x0000_0020 => "MatchedSerializers";
        const PROJECT_USER_CONFIG = 0x0000_0040 => "ProjectUserConfig";
        const NATIVE = 0x0000_0080 => "Native";
        const NO_EXPORT = 0x0000_0100 => "NoExport";
        const NOT_PLACEABLE = 0x0000_0200 => "NotPlaceable";
        const PER_OBJECT_CONFIG = 0x0000_0400 => "PerObjectConfig";
        const REPLICATION_DATA_IS_SET_UP = 0x0000_0800 => "ReplicationDataIsSetUp";
        const EDIT_INLINE_NEW = 0x0000_1000 => "EditInlineNew";
        const COLLAPSE_CATEGORIES = 0x0000_2000 => "CollapseCategories";
        const INTERFACE = 0x0000_4000 => "Interface";
        const CUSTOM_CONSTRUCTOR = 0x0000_8000 => "CustomConstructor";
        const CONST = 0x0001_0000 => "Const";
        const LAYOUT_CHANGING = 0x0002_0000 => "LayoutChanging";
        const COMPILED_FROM_BLUEPRINT = 0x0004_0000 => "CompiledFromBlueprint";
        const MINIMAL_API = 0x0008_0000 => "MinimalAPI";
        const REQUIRED_API = 0x0010_0000 => "RequiredAPI";
        const DEFAULT_TO_INSTANCED = 0x0020_0000 => "DefaultToInstanced";
        const TOKEN_STREAM_ASSEMBLED = 0x0040_0000 => "TokenStreamAssembled";
        const HAS_INSTANCED_REFERENCE = 0x0080_0000 => "HasInstancedReference";
        const HIDDEN = 0x0100_0000 => "Hidden";
        const DEPRECATED = 0x0200_0000 => "Deprecated";
        const HIDE_DROP_DOWN = 0x0400_0000 => "HideDropDown";
        const GLOBAL_USER_CONFIG = 0x0800_0000 => "GlobalUserConfig";
        const INTRINSIC = 0x1000_0000 => "Intrinsic";
        const CONSTRUCTED = 0x2000_0000 => "Constructed";
        const CONFIG_DO_NOT_CHECK_DEFAULTS = 0x4000_0000 => "ConfigDoNotCheckDefaults";
        const NEWER_VERSION_EXISTS = 0x8000_0000 => "NewerVersionExists";
    }
}

flag_domain! {
    /// `EFieldClassID`: the id bit identifying an `FFieldClass`
    pub struct FieldClassId: u64 {
        const INT8 = 1 << 1 => "Int8";
        const BYTE = 1 << 6 => "Byte";
        const INT = 1 << 7 => "Int";
        const FLOAT = 1 << 8 => "Float";
        const UINT64 = 1 << 9 => "UInt64";
        const CLASS = 1 << 10 => "Class";
        const UINT32 = 1 << 11 => "UInt32";
        const INTERFACE = 1 << 12 => "Interface";
        const NAME = 1 << 13 => "Name";
        const STRING = 1 << 14 => "String";
        const OBJECT = 1 << 16 => "Object";
        const BOOL = 1 << 17 => "Bool";
        const UINT16 = 1 << 18 => "UInt16";
        const STRUCT = 1 << 20 => "Struct";
        const ARRAY = 1 << 21 => "Array";
        const INT64 = 1 << 22 => "Int64";
        const DELEGATE = 1 << 23 => "Delegate";
        const SOFT_OBJECT = 1 << 27 => "SoftObject";
        const LAZY_OBJECT = 1 << 28 => "LazyObject";
        const WEAK_OBJECT = 1 << 29 => "WeakObject";
        const TEXT = 1 << 30 => "Text";
        const INT16 = 1 << 31 => "Int16";
        const DOUBLE = 1 << 32 => "Double";
        const SOFT_CLASS = 1 << 33 => "SoftClass";
        const MAP = 1 << 46 => "Map";
        const SET = 1 << 47 => "Set";
        const ENUM = 1 << 48 => "Enum";
        const MULTICAST_INLINE_DELEGATE = 1 << 50 => "MulticastInlineDelegate";
        const MULTICAST_SPARSE_DELEGATE = 1 << 51 => "MulticastSparseDelegate";
        const OBJECT_POINTER = 1 << 53 => "ObjectPointer";
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_single_bits<D: FlagDomain>() {
        let mut seen = 0u64;
        for (flag, name) in D::NAMED {
            let bits = flag.raw();
            assert_eq!(bits.count_ones(), 1, "{}::{} is not a single bit", D::DOMAIN, name);
            assert_eq!(seen & bits, 0, "{}::{} reuses a bit", D::DOMAIN, name);
            seen |= bits;
        }
    }

    #[test]
    fn test_every_named_flag_is_one_unique_bit() {
        assert_single_bits::<PropertyFlags>();
        assert_single_bits::<FunctionFlags>();
        assert_single_bits::<ObjectFlags>();
        assert_single_bits::<ClassCastFlags>();
        assert_single_bits::<ClassFlags>();
        assert_single_bits::<FieldClassId>();
    }

    #[test]
    fn test_function_flags_stringify_in_declaration_order() {
        let built_forward = FunctionFlags::NATIVE | FunctionFlags::EVENT | FunctionFlags::BLUEPRINT_CALLABLE;
        let built_backward = FunctionFlags::BLUEPRINT_CALLABLE
            .union(FunctionFlags::EVENT)
            .union(FunctionFlags::NATIVE);

        assert_eq!(built_forward.stringify(", "), "Native, Event, BlueprintCallable");
        assert_eq!(built_backward.stringify(", "), "Native, Event, BlueprintCallable");
    }

    #[test]
    fn test_stringify_empty_and_single() {
        assert_eq!(PropertyFlags::none().stringify(", "), "");
        assert_eq!(ObjectFlags::empty().to_string(), "");
        assert_eq!(ClassFlags::ABSTRACT.stringify(" | "), "Abstract");
        assert_eq!(FieldClassId::OBJECT_POINTER.to_string(), "ObjectPointer");
    }

    #[test]
    fn test_stringify_has_no_dangling_separator() {
        let flags = PropertyFlags::EDIT | PropertyFlags::SKIP_SERIALIZATION;
        let text = flags.stringify(" | ");

        assert_eq!(text, "Edit | SkipSerialization");
        assert!(!text.starts_with(" | "));
        assert!(!text.ends_with(" | "));
    }

    #[test]
    fn test_stringify_does_not_mutate_and_is_repeatable() {
        let flags = ClassCastFlags::ACTOR | ClassCastFlags::PAWN;
        let first = flags.stringify(", ");
        let second = flags.stringify(", ");

        assert_eq!(first, second);
        assert_eq!(flags, ClassCastFlags::ACTOR | ClassCastFlags::PAWN);
    }

    #[test]
    fn test_display_names_follow_engine_spelling() {
        assert_eq!(FunctionFlags::HAS_OUT_PARMS.to_string(), "HasOutParams");
        assert_eq!(ClassCastFlags::FIELD_PATH_PROPERTY.to_string(), "FieldPathProperty");
        assert_eq!(PropertyFlags::NON_PIE_DUPLICATE_TRANSIENT.to_string(), "NonPIEDuplicateTransient");
    }

    #[test]
    fn test_unknown_bits_are_kept_but_not_named() {
        // 0x1000 and 0x8000 are unassigned property bits
        let flags = PropertyFlags::from_raw(0x1000 | 0x8000 | 0x1);

        assert_eq!(flags.raw(), 0x9001);
        assert_eq!(flags.unknown_bits(), 0x9000);
        assert_eq!(flags.stringify(", "), "Edit");
        assert_eq!(PropertyFlags::from_raw(0x1000).stringify(", "), "");
    }

    #[test]
    fn test_union_laws() {
        let samples = [
            FunctionFlags::none(),
            FunctionFlags::FINAL,
            FunctionFlags::NET | FunctionFlags::NET_RELIABLE,
            FunctionFlags::from_raw(0x30),
            FunctionFlags::all(),
        ];

        for &a in &samples {
            assert_eq!(a.union(FunctionFlags::none()), a);
            for &b in &samples {
                assert_eq!(a.union(b), b.union(a));
                for &c in &samples {
                    assert_eq!(a.union(b).union(c), a.union(b.union(c)));
                }
            }
        }
    }

    #[test]
    fn test_test_requires_the_bit() {
        let flags = FunctionFlags::STATIC | FunctionFlags::FINAL;

        assert!(flags.test(FunctionFlags::STATIC));
        assert!(!flags.test(FunctionFlags::NATIVE));
        assert!(!flags.test(FunctionFlags::none()));
    }

    #[test]
    fn test_from_raw_truncates_to_domain_width() {
        let flags = ObjectFlags::from_raw(0x1_0000_0001);

        assert_eq!(flags.raw(), 0x1);
        assert!(flags.test(ObjectFlags::PUBLIC));
    }
}
