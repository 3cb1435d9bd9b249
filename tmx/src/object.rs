use quick_xml::events::{BytesStart, Event};
use serde::Serialize;

use crate::errors::{TmxError, TmxResult};
use crate::property::{Property, parse_properties};
use crate::reference::{ParseContext, resolve_template};
use crate::tileset::Image;
use crate::xml::{self, XmlReader};

/// A layer of free-standing objects.
#[derive(Clone, Debug, Serialize)]
pub struct ObjectGroup {
    /// The name of the object group.
    pub name: String,
    /// The color used to display the objects in this group.
    pub color: String,
    /// The x coordinate of the object group in tiles.
    pub x: i32,
    /// The y coordinate of the object group in tiles.
    pub y: i32,
    /// The width of the object group in tiles.
    pub width: i32,
    /// The opacity of the layer, 0 to 1.
    pub opacity: f64,
    /// Whether the layer is shown.
    pub visible: bool,
    /// The rendering x offset in pixels.
    pub offset_x: f64,
    /// The rendering y offset in pixels.
    pub offset_y: f64,
    /// Whether objects are drawn in document order (`index`) or sorted by
    /// y coordinate (`topdown`, the default).
    pub draw_order: String,
    /// Custom properties of the group.
    pub properties: Vec<Property>,
    /// The objects of the group.
    pub objects: Vec<Object>,
}

impl Default for ObjectGroup {
    fn default() -> Self {
        Self {
            name: String::new(),
            color: String::new(),
            x: 0,
            y: 0,
            width: 0,
            opacity: 1.0,
            visible: true,
            offset_x: 0.0,
            offset_y: 0.0,
            draw_order: "topdown".to_string(),
            properties: Vec::new(),
            objects: Vec::new(),
        }
    }
}

/// A single placed object: a spawn point, a collision shape, a text label…
#[derive(Clone, Debug, Serialize)]
pub struct Object {
    /// The unique id of the object within its map.
    pub id: u32,
    /// The name of the object.
    pub name: String,
    /// The type of the object (`type` attribute).
    pub object_type: String,
    /// The x coordinate in pixels.
    pub x: f64,
    /// The y coordinate in pixels.
    pub y: f64,
    /// The width in pixels.
    pub width: f64,
    /// The height in pixels.
    pub height: f64,
    /// The rotation in degrees, clockwise.
    pub rotation: f64,
    /// For tile objects, the global id of the tile shown.
    pub gid: u32,
    /// Whether the object is shown.
    pub visible: bool,
    /// The path of a template file this object inherits defaults from.
    pub template: String,
    /// Custom properties of the object.
    pub properties: Vec<Property>,
    /// Whether the object is an ellipse fitted into its bounding box.
    pub ellipse: bool,
    /// Whether the object is a single point at its position.
    pub point: bool,
    /// Closed polygon shapes.
    pub polygons: Vec<Polygon>,
    /// Open polyline shapes.
    pub polylines: Vec<Polyline>,
    /// A text label.
    pub text: Option<Text>,
    /// An image shown at the object's position.
    pub image: Option<Image>,
}

impl Default for Object {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            object_type: String::new(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            gid: 0,
            visible: true,
            template: String::new(),
            properties: Vec::new(),
            ellipse: false,
            point: false,
            polygons: Vec::new(),
            polylines: Vec::new(),
            text: None,
            image: None,
        }
    }
}

/// A closed polygon shape.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Polygon {
    /// Space-separated `x,y` pixel coordinates, as written.
    pub points: String,
}

/// An open polyline shape.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Polyline {
    /// Space-separated `x,y` pixel coordinates, as written.
    pub points: String,
}

/// A text label with its font settings.
#[derive(Clone, Debug, Serialize)]
pub struct Text {
    pub font_family: String,
    /// The font size in pixels.
    pub pixel_size: f64,
    /// Whether word wrapping is enabled.
    pub wrap: bool,
    /// The text color in `#AARRGGBB` or `#RRGGBB` format.
    pub color: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikeout: bool,
    pub kerning: bool,
    /// Horizontal alignment: `left`, `center` or `right`.
    pub halign: String,
    /// Vertical alignment: `top`, `center` or `bottom`.
    pub valign: String,
    /// The character data of the label.
    pub content: String,
}

impl Default for Text {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            pixel_size: 16.0,
            wrap: false,
            color: "#000000".to_string(),
            bold: false,
            italic: false,
            underline: false,
            strikeout: false,
            kerning: true,
            halign: "left".to_string(),
            valign: "top".to_string(),
            content: String::new(),
        }
    }
}

impl ObjectGroup {
    pub(crate) fn parse(
        reader: &mut XmlReader<'_>,
        start: &BytesStart<'_>,
        ctx: &ParseContext<'_>,
    ) -> TmxResult<Self> {
        let mut group = Self::default();
        for attr in start.attributes() {
            let attr = attr?;
            match attr.key.as_ref() {
                b"name" => group.name = xml::attr_string(&attr)?,
                b"color" => group.color = xml::attr_string(&attr)?,
                b"x" => group.x = xml::attr_parse("objectgroup", &attr)?,
                b"y" => group.y = xml::attr_parse("objectgroup", &attr)?,
                b"width" => group.width = xml::attr_parse("objectgroup", &attr)?,
                b"opacity" => group.opacity = xml::attr_parse("objectgroup", &attr)?,
                b"visible" => group.visible = xml::attr_bool("objectgroup", &attr)?,
                b"offsetx" => group.offset_x = xml::attr_parse("objectgroup", &attr)?,
                b"offsety" => group.offset_y = xml::attr_parse("objectgroup", &attr)?,
                b"draworder" => group.draw_order = xml::attr_string(&attr)?,
                _ => {}
            }
        }
        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"properties" => group.properties = parse_properties(reader)?,
                    b"object" => group.objects.push(Object::parse(reader, &e, ctx)?),
                    _ => xml::skip_element(reader, &e)?,
                },
                Event::End(_) => return Ok(group),
                Event::Eof => return Err(TmxError::UnexpectedEof("objectgroup")),
                _ => {}
            }
        }
    }
}

impl Object {
    pub(crate) fn parse(
        reader: &mut XmlReader<'_>,
        start: &BytesStart<'_>,
        ctx: &ParseContext<'_>,
    ) -> TmxResult<Self> {
        let mut object = Self::default();
        for attr in start.attributes() {
            let attr = attr?;
            match attr.key.as_ref() {
                b"id" => object.id = xml::attr_parse("object", &attr)?,
                b"name" => object.name = xml::attr_string(&attr)?,
                b"type" => object.object_type = xml::attr_string(&attr)?,
                b"x" => object.x = xml::attr_parse("object", &attr)?,
                b"y" => object.y = xml::attr_parse("object", &attr)?,
                b"width" => object.width = xml::attr_parse("object", &attr)?,
                b"height" => object.height = xml::attr_parse("object", &attr)?,
                b"rotation" => object.rotation = xml::attr_parse("object", &attr)?,
                b"gid" => object.gid = xml::attr_parse("object", &attr)?,
                b"visible" => object.visible = xml::attr_bool("object", &attr)?,
                b"template" => object.template = xml::attr_string(&attr)?,
                _ => {}
            }
        }

        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"properties" => object.properties = parse_properties(reader)?,
                    b"ellipse" => {
                        object.ellipse = true;
                        reader.read_to_end(e.name())?;
                    }
                    b"point" => {
                        object.point = true;
                        reader.read_to_end(e.name())?;
                    }
                    b"polygon" => object.polygons.push(Polygon {
                        points: parse_points(reader, &e)?,
                    }),
                    b"polyline" => object.polylines.push(Polyline {
                        points: parse_points(reader, &e)?,
                    }),
                    b"text" => object.text = Some(Text::parse(reader, &e)?),
                    b"image" => object.image = Some(Image::parse(reader, &e)?),
                    _ => xml::skip_element(reader, &e)?,
                },
                Event::End(_) => break,
                Event::Eof => return Err(TmxError::UnexpectedEof("object")),
                _ => {}
            }
        }

        if !object.template.is_empty() {
            let template = resolve_template(&object.template, ctx)?;
            // resolve_template guarantees at least one object.
            object.apply_template(&template.objects[0]);
        }
        Ok(object)
    }

    /// Fills fields still at their zero/default value from a template
    /// object.
    ///
    /// Presence is detected by comparing against the zero value, so a
    /// field the author explicitly set to its default is indistinguishable
    /// from an unset one. Most visibly: `visible` defaults to `true`, so a
    /// template's hidden flag wins whenever the object did not say
    /// otherwise — even though the author made no explicit choice.
    #[expect(clippy::float_cmp)] // zero-value presence detection is exact
    pub(crate) fn apply_template(&mut self, template: &Self) {
        if self.name.is_empty() {
            self.name = template.name.clone();
        }
        if self.object_type.is_empty() {
            self.object_type = template.object_type.clone();
        }
        if self.x == 0.0 {
            self.x = template.x;
        }
        if self.y == 0.0 {
            self.y = template.y;
        }
        if self.width == 0.0 {
            self.width = template.width;
        }
        if self.height == 0.0 {
            self.height = template.height;
        }
        if self.rotation == 0.0 {
            self.rotation = template.rotation;
        }
        if self.gid == 0 {
            self.gid = template.gid;
        }
        if self.visible {
            self.visible = template.visible;
        }
        if self.properties.is_empty() {
            self.properties = template.properties.clone();
        }
        if !self.ellipse {
            self.ellipse = template.ellipse;
        }
        if !self.point {
            self.point = template.point;
        }
        if self.polygons.is_empty() {
            self.polygons = template.polygons.clone();
        }
        if self.polylines.is_empty() {
            self.polylines = template.polylines.clone();
        }
        if self.text.is_none() {
            self.text = template.text.clone();
        }
        if self.image.is_none() {
            self.image = template.image.clone();
        }
    }
}

impl Text {
    fn parse(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> TmxResult<Self> {
        let mut text = Self::default();
        for attr in start.attributes() {
            let attr = attr?;
            match attr.key.as_ref() {
                b"fontfamily" => text.font_family = xml::attr_string(&attr)?,
                b"pixelsize" => text.pixel_size = xml::attr_parse("text", &attr)?,
                b"wrap" => text.wrap = xml::attr_bool("text", &attr)?,
                b"color" => text.color = xml::attr_string(&attr)?,
                b"bold" => text.bold = xml::attr_bool("text", &attr)?,
                b"italic" => text.italic = xml::attr_bool("text", &attr)?,
                b"underline" => text.underline = xml::attr_bool("text", &attr)?,
                b"strikeout" => text.strikeout = xml::attr_bool("text", &attr)?,
                b"kerning" => text.kerning = xml::attr_bool("text", &attr)?,
                b"halign" => text.halign = xml::attr_string(&attr)?,
                b"valign" => text.valign = xml::attr_string(&attr)?,
                _ => {}
            }
        }
        text.content = xml::read_text_content(reader, "text")?;
        Ok(text)
    }
}

fn parse_points(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> TmxResult<String> {
    let mut points = String::new();
    for attr in start.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"points" {
            points = xml::attr_string(&attr)?;
        }
    }
    reader.read_to_end(start.name())?;
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template_object() -> Object {
        Object {
            name: "from-template".to_string(),
            width: 15.0,
            height: 40.0,
            visible: false,
            ellipse: true,
            ..Object::default()
        }
    }

    #[test]
    fn template_fills_unset_fields() {
        let mut object = Object {
            id: 7,
            ..Object::default()
        };
        object.apply_template(&template_object());
        assert_eq!(object.width, 15.0);
        assert_eq!(object.height, 40.0);
        assert_eq!(object.name, "from-template");
        assert!(object.ellipse);
        // The object's id is its own, never inherited.
        assert_eq!(object.id, 7);
    }

    #[test]
    fn explicit_values_beat_the_template() {
        let mut object = Object {
            name: "mine".to_string(),
            width: 22.0,
            x: 26.0,
            y: 5.0,
            ..Object::default()
        };
        object.apply_template(&template_object());
        assert_eq!(object.name, "mine");
        assert_eq!(object.width, 22.0);
        assert_eq!(object.x, 26.0);
        assert_eq!(object.y, 5.0);
        // height was unset, so it is inherited.
        assert_eq!(object.height, 40.0);
    }

    #[test]
    fn default_visible_is_overwritten_by_the_template() {
        // `visible` left at its implicit default is indistinguishable from
        // an explicit `visible="1"`, so the template's hidden flag wins in
        // both cases. This asserts the documented overwrite-on-default
        // behavior, not an idealized "only overwrite truly absent" merge.
        let mut object = Object::default();
        assert!(object.visible);
        object.apply_template(&template_object());
        assert!(!object.visible);
    }

    #[test]
    fn point_flag_is_template_filled() {
        let template = Object {
            point: true,
            ..Object::default()
        };
        let mut object = Object::default();
        object.apply_template(&template);
        assert!(object.point);
    }

    #[test]
    fn hidden_object_keeps_its_flag() {
        let mut object = Object {
            visible: false,
            ..Object::default()
        };
        let mut template = template_object();
        template.visible = true;
        object.apply_template(&template);
        assert!(!object.visible);
    }
}
