use crate::ir::Area;
use crate::layout::ImageSize;
use crate::render::ImageResult;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub area: String,
    pub width: u32,
    pub height: u32,
    pub column_widths: Vec<i32>,
    pub rooms: Vec<RoomDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDump {
    pub id: i32,
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub is_exit_to_other_area: bool,
}

impl LayoutDump {
    pub fn from_result(result: &ImageResult<'_>, area: &Area) -> Self {
        let ImageSize { width, height } = result.size;
        let rooms = result
            .rooms
            .iter()
            .map(|info| RoomDump {
                id: info.room.id,
                name: info.room.name.clone(),
                x: info.rect.x,
                y: info.rect.y,
                width: info.rect.width,
                height: info.rect.height,
                is_exit_to_other_area: info.room.is_exit_to_other_area,
            })
            .collect();

        LayoutDump {
            area: area.name.clone(),
            width,
            height,
            column_widths: result.column_widths.clone(),
            rooms,
        }
    }
}

pub fn write_layout_dump(path: &Path, result: &ImageResult<'_>, area: &Area) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_result(result, area);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
