//! Binary codec
//!
//! Compact little-endian format, no serde on the hot path:
//! - sum types: `u32` tag, then the variant's fields in declaration order
//! - surface ids: `u64`
//! - dimensions and lengths: `f32`
//! - enum codes and color channels: `u8`
//! - `Option<T>`: presence byte (0/1), then the value when present
//! - strings and sequences: LEB128 length, then the payload

use crate::{
    Align, ApiMsg, ApiResponse, Border, BorderRadius, BorderSide, BorderStyle, Bounds, BoxShadow,
    Color, Dimension, ElementChild, Flex, FlexDirection, FlexWrap, Flow, Image, JustifyContent,
    Overflow, Rect, SceneChange, Size, StyleProp, SurfaceId, TextAlign, TextRecord, TextStyle,
    Vector2f, WindowEvent, WindowId,
};

/// Wire encoding/decoding errors
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("unknown {ty} tag: {tag}")]
    UnknownTag { ty: &'static str, tag: u32 },

    #[error("malformed length prefix")]
    InvalidLength,

    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    #[error("surface id out of range: {0}")]
    IdOutOfRange(u64),

    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Types with a binary wire representation
pub trait WireEncode {
    /// Append the encoded value to `buf`
    fn encode(&self, buf: &mut Vec<u8>);

    /// Encode into a fresh buffer
    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf
    }
}

/// Types decodable from the binary wire representation
pub trait WireDecode: Sized {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, WireError>;

    /// Decode a complete message; leftover bytes are an error
    fn from_bytes(buf: &[u8]) -> Result<Self, WireError> {
        let mut reader = Reader::new(buf);
        let value = Self::decode(&mut reader)?;
        reader.finish()?;
        Ok(value)
    }
}

/// Write variable-length integer (LEB128)
pub fn write_varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Write u16 little-endian
pub fn write_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Write u32 little-endian
pub fn write_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Write u64 little-endian
pub fn write_u64(buf: &mut Vec<u8>, value: u64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Write f32 little-endian
pub fn write_f32(buf: &mut Vec<u8>, value: f32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Write length-prefixed bytes
pub fn write_bytes(buf: &mut Vec<u8>, data: &[u8]) {
    write_varint(buf, data.len() as u64);
    buf.extend_from_slice(data);
}

/// Write length-prefixed string
pub fn write_string(buf: &mut Vec<u8>, s: &str) {
    write_bytes(buf, s.as_bytes());
}

/// Cursor over an encoded message
#[derive(Debug)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes not consumed yet
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Fail if anything is left over
    pub fn finish(&self) -> Result<(), WireError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(WireError::TrailingBytes(n)),
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], WireError> {
        if self.remaining() < len {
            return Err(WireError::UnexpectedEof);
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], WireError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, WireError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, WireError> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, WireError> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, WireError> {
        Ok(u64::from_le_bytes(self.take_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32, WireError> {
        Ok(f32::from_le_bytes(self.take_array()?))
    }

    /// Read variable-length integer (LEB128)
    pub fn read_varint(&mut self) -> Result<u64, WireError> {
        let mut result: u64 = 0;
        let mut shift = 0;

        loop {
            if shift >= 64 {
                return Err(WireError::InvalidLength);
            }
            let byte = self.read_u8()?;
            result |= ((byte & 0x7F) as u64) << shift;
            shift += 7;

            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
    }

    /// Read a length prefix, bounded by what is left in the buffer
    fn read_len(&mut self) -> Result<usize, WireError> {
        let len = self.read_varint()?;
        usize::try_from(len).map_err(|_| WireError::InvalidLength)
    }

    /// Read length-prefixed bytes
    pub fn read_bytes(&mut self) -> Result<&'a [u8], WireError> {
        let len = self.read_len()?;
        self.take(len)
    }

    /// Read length-prefixed string
    pub fn read_string(&mut self) -> Result<String, WireError> {
        let bytes = self.read_bytes()?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| WireError::InvalidUtf8)
    }
}

// Primitives and containers

impl WireEncode for bool {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(*self as u8);
    }
}

impl WireDecode for bool {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, WireError> {
        match reader.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            tag => Err(WireError::UnknownTag { ty: "bool", tag: tag as u32 }),
        }
    }
}

impl WireEncode for u16 {
    fn encode(&self, buf: &mut Vec<u8>) {
        write_u16(buf, *self);
    }
}

impl WireDecode for u16 {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, WireError> {
        reader.read_u16()
    }
}

impl WireEncode for u32 {
    fn encode(&self, buf: &mut Vec<u8>) {
        write_u32(buf, *self);
    }
}

impl WireDecode for u32 {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, WireError> {
        reader.read_u32()
    }
}

impl WireEncode for f32 {
    fn encode(&self, buf: &mut Vec<u8>) {
        write_f32(buf, *self);
    }
}

impl WireDecode for f32 {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, WireError> {
        reader.read_f32()
    }
}

impl WireEncode for String {
    fn encode(&self, buf: &mut Vec<u8>) {
        write_string(buf, self);
    }
}

impl WireDecode for String {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, WireError> {
        reader.read_string()
    }
}

impl<T: WireEncode> WireEncode for Option<T> {
    fn encode(&self, buf: &mut Vec<u8>) {
        match self {
            Some(value) => {
                buf.push(1);
                value.encode(buf);
            }
            None => buf.push(0),
        }
    }
}

impl<T: WireDecode> WireDecode for Option<T> {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, WireError> {
        match reader.read_u8()? {
            0 => Ok(None),
            1 => T::decode(reader).map(Some),
            tag => Err(WireError::UnknownTag { ty: "Option", tag: tag as u32 }),
        }
    }
}

impl<T: WireEncode> WireEncode for Vec<T> {
    fn encode(&self, buf: &mut Vec<u8>) {
        write_varint(buf, self.len() as u64);
        for item in self {
            item.encode(buf);
        }
    }
}

impl<T: WireDecode> WireDecode for Vec<T> {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, WireError> {
        let len = reader.read_len()?;
        // every element takes at least one byte
        let mut items = Vec::with_capacity(len.min(reader.remaining()));
        for _ in 0..len {
            items.push(T::decode(reader)?);
        }
        Ok(items)
    }
}

// Ids

impl WireEncode for SurfaceId {
    fn encode(&self, buf: &mut Vec<u8>) {
        write_u64(buf, self.0 as u64);
    }
}

impl WireDecode for SurfaceId {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, WireError> {
        let raw = reader.read_u64()?;
        u32::try_from(raw)
            .map(SurfaceId)
            .map_err(|_| WireError::IdOutOfRange(raw))
    }
}

impl WireEncode for WindowId {
    fn encode(&self, buf: &mut Vec<u8>) {
        write_u32(buf, self.0);
    }
}

impl WireDecode for WindowId {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, WireError> {
        reader.read_u32().map(WindowId)
    }
}

/// `u8`-coded fieldless enums
macro_rules! impl_code_enum {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl WireEncode for $ty {
                fn encode(&self, buf: &mut Vec<u8>) {
                    buf.push(self.code());
                }
            }

            impl WireDecode for $ty {
                fn decode(reader: &mut Reader<'_>) -> Result<Self, WireError> {
                    let code = reader.read_u8()?;
                    $ty::from_u8(code).ok_or(WireError::UnknownTag {
                        ty: stringify!($ty),
                        tag: code as u32,
                    })
                }
            }
        )+
    };
}

impl_code_enum!(FlexDirection, FlexWrap, Align, JustifyContent, Overflow, TextAlign, BorderStyle);

/// Plain structs, fields encoded in declaration order
macro_rules! impl_struct {
    ($($ty:ident { $($field:ident),+ $(,)? })+) => {
        $(
            impl WireEncode for $ty {
                fn encode(&self, buf: &mut Vec<u8>) {
                    $(self.$field.encode(buf);)+
                }
            }

            impl WireDecode for $ty {
                fn decode(reader: &mut Reader<'_>) -> Result<Self, WireError> {
                    Ok(Self { $($field: WireDecode::decode(reader)?),+ })
                }
            }
        )+
    };
}

impl_struct! {
    Size { width, height }
    Flex { grow, shrink, basis }
    Flow { direction, wrap, align_content, align_items, align_self, justify_content }
    Rect { top, right, bottom, left }
    BorderRadius { top_left, top_right, bottom_right, bottom_left }
    Border { top, right, bottom, left }
    BorderSide { width, style, color }
    BoxShadow { color, offset, blur, spread }
    Vector2f { x, y }
    Image { url }
    TextStyle { color, font_size, line_height, align }
    TextRecord { text }
    Bounds { a, b }
}

impl WireEncode for Color {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_array());
    }
}

impl WireDecode for Color {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, WireError> {
        let [r, g, b, a] = reader.take_array()?;
        Ok(Color::new(r, g, b, a))
    }
}

// Sum types

impl WireEncode for Dimension {
    fn encode(&self, buf: &mut Vec<u8>) {
        match *self {
            Dimension::Auto => write_u32(buf, 0),
            Dimension::Point(v) => {
                write_u32(buf, 1);
                write_f32(buf, v);
            }
            Dimension::Percent(v) => {
                write_u32(buf, 2);
                write_f32(buf, v);
            }
        }
    }
}

impl WireDecode for Dimension {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, WireError> {
        match reader.read_u32()? {
            0 => Ok(Dimension::Auto),
            1 => Ok(Dimension::Point(reader.read_f32()?)),
            2 => Ok(Dimension::Percent(reader.read_f32()?)),
            tag => Err(WireError::UnknownTag { ty: "Dimension", tag }),
        }
    }
}

impl WireEncode for ElementChild {
    fn encode(&self, buf: &mut Vec<u8>) {
        match self {
            ElementChild::Element(id) => {
                write_u32(buf, 0);
                id.encode(buf);
            }
            ElementChild::Text(id) => {
                write_u32(buf, 1);
                id.encode(buf);
            }
        }
    }
}

impl WireDecode for ElementChild {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, WireError> {
        match reader.read_u32()? {
            0 => Ok(ElementChild::Element(SurfaceId::decode(reader)?)),
            1 => Ok(ElementChild::Text(SurfaceId::decode(reader)?)),
            tag => Err(WireError::UnknownTag { ty: "ElementChild", tag }),
        }
    }
}

impl WireEncode for StyleProp {
    fn encode(&self, buf: &mut Vec<u8>) {
        write_u32(buf, self.tag());
        match self {
            StyleProp::Size(v) => v.encode(buf),
            StyleProp::Flex(v) => v.encode(buf),
            StyleProp::Flow(v) => v.encode(buf),
            StyleProp::Padding(v) | StyleProp::Margin(v) => v.encode(buf),
            StyleProp::BorderRadius(v) => v.encode(buf),
            StyleProp::Border(v) => v.encode(buf),
            StyleProp::BoxShadow(v) => v.encode(buf),
            StyleProp::BackgroundColor(v) => v.encode(buf),
            StyleProp::Image(v) => v.encode(buf),
            StyleProp::Text(v) => v.encode(buf),
            StyleProp::Overflow(v) => v.encode(buf),
        }
    }
}

impl WireDecode for StyleProp {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, WireError> {
        let prop = match reader.read_u32()? {
            0 => StyleProp::Size(WireDecode::decode(reader)?),
            1 => StyleProp::Flex(WireDecode::decode(reader)?),
            2 => StyleProp::Flow(WireDecode::decode(reader)?),
            3 => StyleProp::Padding(WireDecode::decode(reader)?),
            4 => StyleProp::Margin(WireDecode::decode(reader)?),
            5 => StyleProp::BorderRadius(WireDecode::decode(reader)?),
            6 => StyleProp::Border(WireDecode::decode(reader)?),
            7 => StyleProp::BoxShadow(WireDecode::decode(reader)?),
            8 => StyleProp::BackgroundColor(WireDecode::decode(reader)?),
            9 => StyleProp::Image(WireDecode::decode(reader)?),
            10 => StyleProp::Text(WireDecode::decode(reader)?),
            11 => StyleProp::Overflow(WireDecode::decode(reader)?),
            tag => return Err(WireError::UnknownTag { ty: "StyleProp", tag }),
        };
        Ok(prop)
    }
}

impl WireEncode for SceneChange {
    fn encode(&self, buf: &mut Vec<u8>) {
        write_u32(buf, self.tag());
        match self {
            SceneChange::Realloc { element_count, text_count } => {
                write_u32(buf, *element_count);
                write_u32(buf, *text_count);
            }
            SceneChange::InsertAt { parent, child, index } => {
                parent.encode(buf);
                child.encode(buf);
                write_u32(buf, *index);
            }
            SceneChange::RemoveChild { parent, child } => {
                parent.encode(buf);
                child.encode(buf);
            }
            SceneChange::SetStyleProp { surface, prop } => {
                surface.encode(buf);
                prop.encode(buf);
            }
            SceneChange::SetText { text, value } => {
                text.encode(buf);
                value.encode(buf);
            }
            SceneChange::SetTagName { surface, tag } => {
                surface.encode(buf);
                write_string(buf, tag);
            }
            SceneChange::SetAttribute { surface, name, value } => {
                surface.encode(buf);
                write_string(buf, name);
                value.encode(buf);
            }
        }
    }
}

impl WireDecode for SceneChange {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, WireError> {
        let change = match reader.read_u32()? {
            0 => SceneChange::Realloc {
                element_count: reader.read_u32()?,
                text_count: reader.read_u32()?,
            },
            1 => SceneChange::InsertAt {
                parent: SurfaceId::decode(reader)?,
                child: ElementChild::decode(reader)?,
                index: reader.read_u32()?,
            },
            2 => SceneChange::RemoveChild {
                parent: SurfaceId::decode(reader)?,
                child: ElementChild::decode(reader)?,
            },
            3 => SceneChange::SetStyleProp {
                surface: SurfaceId::decode(reader)?,
                prop: StyleProp::decode(reader)?,
            },
            4 => SceneChange::SetText {
                text: SurfaceId::decode(reader)?,
                value: TextRecord::decode(reader)?,
            },
            5 => SceneChange::SetTagName {
                surface: SurfaceId::decode(reader)?,
                tag: reader.read_string()?,
            },
            6 => SceneChange::SetAttribute {
                surface: SurfaceId::decode(reader)?,
                name: reader.read_string()?,
                value: WireDecode::decode(reader)?,
            },
            tag => return Err(WireError::UnknownTag { ty: "SceneChange", tag }),
        };
        Ok(change)
    }
}

impl WireEncode for WindowEvent {
    fn encode(&self, buf: &mut Vec<u8>) {
        write_u32(buf, self.tag());
        match self {
            WindowEvent::MouseMove { target }
            | WindowEvent::MouseDown { target }
            | WindowEvent::MouseUp { target }
            | WindowEvent::Scroll { target } => target.encode(buf),
            WindowEvent::KeyDown(code) | WindowEvent::KeyPress(code) | WindowEvent::KeyUp(code) => {
                write_u16(buf, *code)
            }
            WindowEvent::Focus
            | WindowEvent::Blur
            | WindowEvent::Resize
            | WindowEvent::Close
            | WindowEvent::Unknown => {}
        }
    }
}

impl WireDecode for WindowEvent {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, WireError> {
        let event = match reader.read_u32()? {
            0 => WindowEvent::MouseMove { target: SurfaceId::decode(reader)? },
            1 => WindowEvent::MouseDown { target: SurfaceId::decode(reader)? },
            2 => WindowEvent::MouseUp { target: SurfaceId::decode(reader)? },
            3 => WindowEvent::Scroll { target: SurfaceId::decode(reader)? },
            4 => WindowEvent::KeyDown(reader.read_u16()?),
            5 => WindowEvent::KeyPress(reader.read_u16()?),
            6 => WindowEvent::KeyUp(reader.read_u16()?),
            7 => WindowEvent::Focus,
            8 => WindowEvent::Blur,
            9 => WindowEvent::Resize,
            10 => WindowEvent::Close,
            11 => WindowEvent::Unknown,
            tag => return Err(WireError::UnknownTag { ty: "WindowEvent", tag }),
        };
        Ok(event)
    }
}

impl WireEncode for ApiMsg {
    fn encode(&self, buf: &mut Vec<u8>) {
        write_u32(buf, self.tag());
        match self {
            ApiMsg::GetEvents { poll } => poll.encode(buf),
            ApiMsg::UpdateScene { window, changes } => {
                window.encode(buf);
                changes.encode(buf);
            }
            ApiMsg::GetBounds { window, surface } => {
                window.encode(buf);
                surface.encode(buf);
            }
            ApiMsg::CreateWindow { title, width, height } => {
                write_string(buf, title);
                write_u32(buf, *width);
                write_u32(buf, *height);
            }
            ApiMsg::ResizeWindow { window, width, height } => {
                window.encode(buf);
                write_u32(buf, *width);
                write_u32(buf, *height);
            }
            ApiMsg::DestroyWindow { window } => window.encode(buf),
            ApiMsg::Query { window, root, selector, all } => {
                window.encode(buf);
                root.encode(buf);
                write_string(buf, selector);
                all.encode(buf);
            }
        }
    }
}

impl WireDecode for ApiMsg {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, WireError> {
        let msg = match reader.read_u32()? {
            0 => ApiMsg::GetEvents { poll: bool::decode(reader)? },
            1 => ApiMsg::UpdateScene {
                window: WindowId::decode(reader)?,
                changes: WireDecode::decode(reader)?,
            },
            2 => ApiMsg::GetBounds {
                window: WindowId::decode(reader)?,
                surface: SurfaceId::decode(reader)?,
            },
            3 => ApiMsg::CreateWindow {
                title: reader.read_string()?,
                width: reader.read_u32()?,
                height: reader.read_u32()?,
            },
            4 => ApiMsg::ResizeWindow {
                window: WindowId::decode(reader)?,
                width: reader.read_u32()?,
                height: reader.read_u32()?,
            },
            5 => ApiMsg::DestroyWindow { window: WindowId::decode(reader)? },
            6 => ApiMsg::Query {
                window: WindowId::decode(reader)?,
                root: SurfaceId::decode(reader)?,
                selector: reader.read_string()?,
                all: bool::decode(reader)?,
            },
            tag => return Err(WireError::UnknownTag { ty: "ApiMsg", tag }),
        };
        Ok(msg)
    }
}

impl WireEncode for ApiResponse {
    fn encode(&self, buf: &mut Vec<u8>) {
        write_u32(buf, self.tag());
        match self {
            ApiResponse::Events { events } => events.encode(buf),
            ApiResponse::Nothing => {}
            ApiResponse::Bounds { bounds } => bounds.encode(buf),
            ApiResponse::WindowId { window } => window.encode(buf),
            ApiResponse::Surfaces { surfaces } => surfaces.encode(buf),
            ApiResponse::Error { message } => write_string(buf, message),
        }
    }
}

impl WireDecode for ApiResponse {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, WireError> {
        let response = match reader.read_u32()? {
            0 => ApiResponse::Events { events: WireDecode::decode(reader)? },
            1 => ApiResponse::Nothing,
            2 => ApiResponse::Bounds { bounds: Bounds::decode(reader)? },
            3 => ApiResponse::WindowId { window: WindowId::decode(reader)? },
            4 => ApiResponse::Surfaces { surfaces: WireDecode::decode(reader)? },
            5 => ApiResponse::Error { message: reader.read_string()? },
            tag => return Err(WireError::UnknownTag { ty: "ApiResponse", tag }),
        };
        Ok(response)
    }
}
