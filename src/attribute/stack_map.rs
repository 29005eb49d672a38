use crate::attribute::{saturating_u32, Composite, LengthGuard, Payload};
use crate::{ClassBuffer, ClassFileError, ClassFileResult, ClassWriter, ConstantPool};
use strum::{Display, FromRepr};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, FromRepr)]
#[repr(u8)]
pub enum VerificationTypeTag {
    Top = 0,
    Integer = 1,
    Float = 2,
    Double = 3,
    Long = 4,
    Null = 5,
    UninitializedThis = 6,
    Object = 7,
    Uninitialized = 8,
}

impl VerificationTypeTag {
    pub fn from_u8(tag: u8) -> ClassFileResult<VerificationTypeTag> {
        Self::from_repr(tag).ok_or(ClassFileError::BadVerificationTypeTag(tag))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VerificationType {
    Top,
    Integer,
    Float,
    Double,
    Long,
    Null,
    UninitializedThis,
    Object { cpool_index: u16 },
    /// `offset` is the bytecode offset of the `new` instruction that created the value.
    Uninitialized { offset: u16 },
}

impl VerificationType {
    pub fn tag(&self) -> VerificationTypeTag {
        match self {
            VerificationType::Top => VerificationTypeTag::Top,
            VerificationType::Integer => VerificationTypeTag::Integer,
            VerificationType::Float => VerificationTypeTag::Float,
            VerificationType::Double => VerificationTypeTag::Double,
            VerificationType::Long => VerificationTypeTag::Long,
            VerificationType::Null => VerificationTypeTag::Null,
            VerificationType::UninitializedThis => VerificationTypeTag::UninitializedThis,
            VerificationType::Object { .. } => VerificationTypeTag::Object,
            VerificationType::Uninitialized { .. } => VerificationTypeTag::Uninitialized,
        }
    }

    fn read(buf: &mut ClassBuffer<'_>) -> ClassFileResult<VerificationType> {
        let value = match VerificationTypeTag::from_u8(buf.read_u8()?)? {
            VerificationTypeTag::Top => VerificationType::Top,
            VerificationTypeTag::Integer => VerificationType::Integer,
            VerificationTypeTag::Float => VerificationType::Float,
            VerificationTypeTag::Double => VerificationType::Double,
            VerificationTypeTag::Long => VerificationType::Long,
            VerificationTypeTag::Null => VerificationType::Null,
            VerificationTypeTag::UninitializedThis => VerificationType::UninitializedThis,
            VerificationTypeTag::Object => VerificationType::Object {
                cpool_index: buf.read_u16()?,
            },
            VerificationTypeTag::Uninitialized => VerificationType::Uninitialized {
                offset: buf.read_u16()?,
            },
        };
        Ok(value)
    }

    fn write(&self, w: &mut ClassWriter) {
        w.write_u8(self.tag() as u8);
        match self {
            VerificationType::Object { cpool_index } => w.write_u16(*cpool_index),
            VerificationType::Uninitialized { offset } => w.write_u16(*offset),
            _ => {}
        }
    }

    pub fn encoded_len(&self) -> usize {
        match self {
            VerificationType::Object { .. } | VerificationType::Uninitialized { .. } => 3,
            _ => 1,
        }
    }
}

fn types_len(types: &[VerificationType]) -> usize {
    types.iter().map(VerificationType::encoded_len).sum()
}

/// One entry of a `StackMapTable`. Each encoding is its own variant so that a frame is written
/// back with the frame type it was read with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StackMapFrame {
    /// Frame types 0 to 63; the offset delta is the frame type.
    Same { frame_type: u8 },
    /// Frame types 64 to 127; the offset delta is `frame_type - 64`.
    SameLocals1StackItem {
        frame_type: u8,
        stack: VerificationType,
    },
    /// Frame type 247.
    SameLocals1StackItemExtended {
        offset_delta: u16,
        stack: VerificationType,
    },
    /// Frame types 248 to 250, removing `251 - frame_type` locals.
    Chop { frame_type: u8, offset_delta: u16 },
    /// Frame type 251.
    SameExtended { offset_delta: u16 },
    /// Frame types 252 to 254, adding one to three locals.
    Append {
        offset_delta: u16,
        locals: Vec<VerificationType>,
    },
    /// Frame type 255.
    Full {
        offset_delta: u16,
        locals: Vec<VerificationType>,
        stack: Vec<VerificationType>,
    },
}

impl StackMapFrame {
    pub fn frame_type(&self) -> u8 {
        match self {
            StackMapFrame::Same { frame_type }
            | StackMapFrame::SameLocals1StackItem { frame_type, .. }
            | StackMapFrame::Chop { frame_type, .. } => *frame_type,
            StackMapFrame::SameLocals1StackItemExtended { .. } => 247,
            StackMapFrame::SameExtended { .. } => 251,
            // appending more than three locals is not encodable and is caught when writing
            StackMapFrame::Append { locals, .. } => 251u8.wrapping_add(locals.len() as u8),
            StackMapFrame::Full { .. } => 255,
        }
    }

    pub fn offset_delta(&self) -> u16 {
        match self {
            StackMapFrame::Same { frame_type } => *frame_type as u16,
            StackMapFrame::SameLocals1StackItem { frame_type, .. } => {
                (*frame_type as u16).saturating_sub(64)
            }
            StackMapFrame::SameLocals1StackItemExtended { offset_delta, .. }
            | StackMapFrame::Chop { offset_delta, .. }
            | StackMapFrame::SameExtended { offset_delta }
            | StackMapFrame::Append { offset_delta, .. }
            | StackMapFrame::Full { offset_delta, .. } => *offset_delta,
        }
    }

    fn read(buf: &mut ClassBuffer<'_>) -> ClassFileResult<StackMapFrame> {
        let frame_type = buf.read_u8()?;
        let frame = match frame_type {
            0..=63 => StackMapFrame::Same { frame_type },
            64..=127 => StackMapFrame::SameLocals1StackItem {
                frame_type,
                stack: VerificationType::read(buf)?,
            },
            247 => StackMapFrame::SameLocals1StackItemExtended {
                offset_delta: buf.read_u16()?,
                stack: VerificationType::read(buf)?,
            },
            248..=250 => StackMapFrame::Chop {
                frame_type,
                offset_delta: buf.read_u16()?,
            },
            251 => StackMapFrame::SameExtended {
                offset_delta: buf.read_u16()?,
            },
            252..=254 => {
                let offset_delta = buf.read_u16()?;
                let locals = (0..frame_type - 251)
                    .map(|_| VerificationType::read(buf))
                    .collect::<ClassFileResult<Vec<_>>>()?;
                StackMapFrame::Append {
                    offset_delta,
                    locals,
                }
            }
            255 => StackMapFrame::Full {
                offset_delta: buf.read_u16()?,
                locals: buf.read_vec(VerificationType::read)?,
                stack: buf.read_vec(VerificationType::read)?,
            },
            _ => return Err(ClassFileError::BadStackMapFrameType(frame_type)),
        };
        Ok(frame)
    }

    fn write(&self, w: &mut ClassWriter) -> ClassFileResult<()> {
        let frame_type = self.frame_type();
        let valid = match self {
            StackMapFrame::Same { .. } => frame_type <= 63,
            StackMapFrame::SameLocals1StackItem { .. } => (64..=127).contains(&frame_type),
            StackMapFrame::Chop { .. } => (248..=250).contains(&frame_type),
            StackMapFrame::Append { locals, .. } => (1..=3).contains(&locals.len()),
            _ => true,
        };
        if !valid {
            return Err(ClassFileError::BadStackMapFrameType(frame_type));
        }

        w.write_u8(frame_type);
        match self {
            StackMapFrame::Same { .. } => {}
            StackMapFrame::SameLocals1StackItem { stack, .. } => stack.write(w),
            StackMapFrame::SameLocals1StackItemExtended {
                offset_delta,
                stack,
            } => {
                w.write_u16(*offset_delta);
                stack.write(w);
            }
            StackMapFrame::Chop { offset_delta, .. }
            | StackMapFrame::SameExtended { offset_delta } => w.write_u16(*offset_delta),
            StackMapFrame::Append {
                offset_delta,
                locals,
            } => {
                w.write_u16(*offset_delta);
                locals.iter().for_each(|local| local.write(w));
            }
            StackMapFrame::Full {
                offset_delta,
                locals,
                stack,
            } => {
                w.write_u16(*offset_delta);
                w.write_vec("frame locals", locals, |w, local| {
                    local.write(w);
                    Ok(())
                })?;
                w.write_vec("frame stack", stack, |w, item| {
                    item.write(w);
                    Ok(())
                })?;
            }
        }
        Ok(())
    }

    pub fn encoded_len(&self) -> usize {
        match self {
            StackMapFrame::Same { .. } => 1,
            StackMapFrame::SameLocals1StackItem { stack, .. } => 1 + stack.encoded_len(),
            StackMapFrame::SameLocals1StackItemExtended { stack, .. } => 3 + stack.encoded_len(),
            StackMapFrame::Chop { .. } | StackMapFrame::SameExtended { .. } => 3,
            StackMapFrame::Append { locals, .. } => 3 + types_len(locals),
            StackMapFrame::Full { locals, stack, .. } => {
                3 + 2 + types_len(locals) + 2 + types_len(stack)
            }
        }
    }
}

/// Verification frames for a `Code` attribute. The length is cached like [`Code`](crate::Code).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StackMapTable {
    entries: Vec<StackMapFrame>,
    length: u32,
}

impl StackMapTable {
    pub fn new(entries: Vec<StackMapFrame>) -> StackMapTable {
        let mut result = StackMapTable { entries, length: 0 };
        result.recompute_length();
        result
    }

    pub(crate) fn read(buf: &mut ClassBuffer<'_>) -> ClassFileResult<StackMapTable> {
        Ok(StackMapTable::new(buf.read_vec(StackMapFrame::read)?))
    }

    pub fn calculate_length(&self) -> usize {
        2 + self
            .entries
            .iter()
            .map(StackMapFrame::encoded_len)
            .sum::<usize>()
    }

    pub fn entries(&self) -> &[StackMapFrame] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> LengthGuard<'_, StackMapTable, Vec<StackMapFrame>> {
        LengthGuard::new(self, |table| &table.entries, |table| &mut table.entries)
    }

    /// The bytecode offset each frame applies to.
    pub fn offsets(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().enumerate().scan(0u32, |offset, (i, frame)| {
            let delta = frame.offset_delta() as u32;
            *offset = if i == 0 { delta } else { *offset + delta + 1 };
            Some(*offset)
        })
    }
}

impl Payload for StackMapTable {
    fn payload_len(&self) -> usize {
        self.length as usize
    }

    fn write_payload(&self, w: &mut ClassWriter, _pool: &ConstantPool) -> ClassFileResult<()> {
        w.write_vec("stack map frames", &self.entries, |w, frame| frame.write(w))
    }
}

impl Composite for StackMapTable {
    fn length(&self) -> u32 {
        self.length
    }

    fn recompute_length(&mut self) {
        self.length = saturating_u32(self.calculate_length());
    }
}
