//! Mapping-file property type ids
//!
//! The compressed mapping file identifies every property by a one-byte type
//! id. The writer lives elsewhere; this module owns the id table and the
//! classification of a property class by its cast flags.

use super::flags::ClassCastFlags;
use std::fmt;

/// Property type id as written to a mapping file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MappingsType {
    /// `FByteProperty`
    ByteProperty = 0,
    /// `FBoolProperty`
    BoolProperty,
    /// `FIntProperty`
    IntProperty,
    /// `FFloatProperty`
    FloatProperty,
    /// `FObjectProperty` and `FClassProperty`
    ObjectProperty,
    /// `FNameProperty`
    NameProperty,
    /// `FDelegateProperty`
    DelegateProperty,
    /// `FDoubleProperty`
    DoubleProperty,
    /// `FArrayProperty`
    ArrayProperty,
    /// `FStructProperty`
    StructProperty,
    /// `FStrProperty`
    StrProperty,
    /// `FTextProperty`
    TextProperty,
    /// `FInterfaceProperty`
    InterfaceProperty,
    /// All multicast delegate property kinds
    MulticastDelegateProperty,
    /// `FWeakObjectProperty`; readers treat it as a soft object
    WeakObjectProperty,
    /// `FLazyObjectProperty`; readers treat it as a soft object
    LazyObjectProperty,
    /// Legacy asset object id; readers treat it as a soft object
    AssetObjectProperty,
    /// `FSoftObjectProperty` and `FSoftClassProperty`
    SoftObjectProperty,
    /// `FUInt64Property`
    UInt64Property,
    /// `FUInt32Property`
    UInt32Property,
    /// `FUInt16Property`
    UInt16Property,
    /// `FInt64Property`
    Int64Property,
    /// `FInt16Property`
    Int16Property,
    /// `FInt8Property`
    Int8Property,
    /// `FMapProperty`
    MapProperty,
    /// `FSetProperty`
    SetProperty,
    /// `FEnumProperty`
    EnumProperty,
    /// `FFieldPathProperty`
    FieldPathProperty,
    /// `FOptionalProperty`
    OptionalProperty,

    /// Anything the table does not cover
    Unknown = 0xFF,
}

/// Checked in order; subclasses come before the classes they derive from.
const CAST_TABLE: &[(ClassCastFlags, MappingsType)] = &[
    (ClassCastFlags::BYTE_PROPERTY, MappingsType::ByteProperty),
    (ClassCastFlags::BOOL_PROPERTY, MappingsType::BoolProperty),
    (ClassCastFlags::INT_PROPERTY, MappingsType::IntProperty),
    (ClassCastFlags::FLOAT_PROPERTY, MappingsType::FloatProperty),
    (ClassCastFlags::CLASS_PROPERTY, MappingsType::ObjectProperty),
    (ClassCastFlags::SOFT_CLASS_PROPERTY, MappingsType::SoftObjectProperty),
    (ClassCastFlags::OBJECT_PROPERTY, MappingsType::ObjectProperty),
    (ClassCastFlags::NAME_PROPERTY, MappingsType::NameProperty),
    (ClassCastFlags::DELEGATE_PROPERTY, MappingsType::DelegateProperty),
    (ClassCastFlags::DOUBLE_PROPERTY, MappingsType::DoubleProperty),
    (ClassCastFlags::ARRAY_PROPERTY, MappingsType::ArrayProperty),
    (ClassCastFlags::STRUCT_PROPERTY, MappingsType::StructProperty),
    (ClassCastFlags::STR_PROPERTY, MappingsType::StrProperty),
    (ClassCastFlags::TEXT_PROPERTY, MappingsType::TextProperty),
    (ClassCastFlags::INTERFACE_PROPERTY, MappingsType::InterfaceProperty),
    (ClassCastFlags::MULTICAST_INLINE_DELEGATE_PROPERTY, MappingsType::MulticastDelegateProperty),
    (ClassCastFlags::MULTICAST_SPARSE_DELEGATE_PROPERTY, MappingsType::MulticastDelegateProperty),
    (ClassCastFlags::MULTICAST_DELEGATE_PROPERTY, MappingsType::MulticastDelegateProperty),
    (ClassCastFlags::WEAK_OBJECT_PROPERTY, MappingsType::WeakObjectProperty),
    (ClassCastFlags::LAZY_OBJECT_PROPERTY, MappingsType::LazyObjectProperty),
    (ClassCastFlags::SOFT_OBJECT_PROPERTY, MappingsType::SoftObjectProperty),
    (ClassCastFlags::UINT64_PROPERTY, MappingsType::UInt64Property),
    (ClassCastFlags::UINT32_PROPERTY, MappingsType::UInt32Property),
    (ClassCastFlags::UINT16_PROPERTY, MappingsType::UInt16Property),
    (ClassCastFlags::INT64_PROPERTY, MappingsType::Int64Property),
    (ClassCastFlags::INT16_PROPERTY, MappingsType::Int16Property),
    (ClassCastFlags::INT8_PROPERTY, MappingsType::Int8Property),
    (ClassCastFlags::MAP_PROPERTY, MappingsType::MapProperty),
    (ClassCastFlags::SET_PROPERTY, MappingsType::SetProperty),
    (ClassCastFlags::ENUM_PROPERTY, MappingsType::EnumProperty),
    (ClassCastFlags::FIELD_PATH_PROPERTY, MappingsType::FieldPathProperty),
    (ClassCastFlags::OPTIONAL_PROPERTY, MappingsType::OptionalProperty),
];

impl MappingsType {
    /// Classify a property class by its cast flags
    pub fn from_cast_flags(flags: ClassCastFlags) -> Self {
        CAST_TABLE
            .iter()
            .find(|(flag, _)| flags.contains(*flag))
            .map_or(Self::Unknown, |&(_, kind)| kind)
    }

    /// The byte written to the mapping file
    #[inline]
    pub fn id(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for MappingsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
