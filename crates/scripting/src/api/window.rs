//! Miniwindow functions. All rendering happens client-side; these
//! validate arguments and delegate to the `Host` with window and hotspot
//! names. Handler routines are stored by name so reloading a plugin picks
//! up redefinitions.

use mlua::{Lua, MultiValue, Result as LuaResult, Table, Value};
use mudlark_core::enums::{BrushStyle, CircleOp, CursorShape, PenStyle, RectOp};
use mudlark_core::ApiCode;

use crate::host::{HotspotSpec, WindowRect, WindowSpec};
use crate::marshal::{
    expect_max_args, get_bool_or, get_color_or, get_int, get_int_or, get_number_or,
    get_string, get_string_or,
};

use super::ApiContext;

fn rect(args: &MultiValue, first: usize) -> LuaResult<WindowRect> {
    Ok(WindowRect {
        left: get_number_or(args, first, 0.0)?,
        top: get_number_or(args, first + 1, 0.0)?,
        right: get_number_or(args, first + 2, 0.0)?,
        bottom: get_number_or(args, first + 3, 0.0)?,
    })
}

pub(super) fn register(lua: &Lua, globals: &Table, ctx: &ApiContext) -> LuaResult<()> {
    {
        let ctx = ctx.clone();
        globals.set(
            "WindowCreate",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 8, "WindowCreate")?;
                if !ctx.enabled() {
                    return Ok(ApiCode::PluginDisabled.code());
                }
                let name = get_string(&args, 1)?;
                if name.is_empty() {
                    return Ok(ApiCode::NoNameSpecified.code());
                }
                let spec = WindowSpec {
                    left: get_int_or(&args, 2, 0)?,
                    top: get_int_or(&args, 3, 0)?,
                    width: get_int_or(&args, 4, 0)?,
                    height: get_int_or(&args, 5, 0)?,
                    position: get_int_or(&args, 6, 0)?,
                    flags: get_int_or(&args, 7, 0)?,
                    background: get_color_or(&args, 8, None)?,
                };
                Ok(ctx.host.borrow_mut().window_create(&name, spec).code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "WindowDelete",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 1, "WindowDelete")?;
                let name = get_string(&args, 1)?;
                Ok(ctx.host.borrow_mut().window_delete(&name).code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "WindowShow",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 2, "WindowShow")?;
                let name = get_string(&args, 1)?;
                let visible = get_bool_or(&args, 2, true)?;
                Ok(ctx.host.borrow_mut().window_show(&name, visible).code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "WindowResize",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 4, "WindowResize")?;
                let name = get_string(&args, 1)?;
                let width = get_int(&args, 2)?;
                let height = get_int(&args, 3)?;
                let background = get_color_or(&args, 4, None)?;
                Ok(ctx
                    .host
                    .borrow_mut()
                    .window_resize(&name, width, height, background)
                    .code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "WindowPosition",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 5, "WindowPosition")?;
                let name = get_string(&args, 1)?;
                let left = get_int_or(&args, 2, 0)?;
                let top = get_int_or(&args, 3, 0)?;
                let position = get_int_or(&args, 4, 0)?;
                let flags = get_int_or(&args, 5, 0)?;
                Ok(ctx
                    .host
                    .borrow_mut()
                    .window_position(&name, left, top, position, flags)
                    .code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "WindowSetZOrder",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 2, "WindowSetZOrder")?;
                let name = get_string(&args, 1)?;
                let order = get_int(&args, 2)?;
                Ok(ctx.host.borrow_mut().window_set_z_order(&name, order).code())
            })?,
        )?;
    }

    // --- drawing -----------------------------------------------------

    {
        let ctx = ctx.clone();
        globals.set(
            "WindowRectOp",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 8, "WindowRectOp")?;
                let name = get_string(&args, 1)?;
                let Some(op) = RectOp::from_code(get_int(&args, 2)?) else {
                    return Ok(ApiCode::BadParameter.code());
                };
                let area = rect(&args, 3)?;
                let color1 = get_color_or(&args, 7, None)?;
                let color2 = get_color_or(&args, 8, None)?;
                Ok(ctx
                    .host
                    .borrow_mut()
                    .window_rect_op(&name, op, area, color1, color2)
                    .code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "WindowCircleOp",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 15, "WindowCircleOp")?;
                let name = get_string(&args, 1)?;
                let Some(op) = CircleOp::from_code(get_int(&args, 2)?) else {
                    return Ok(ApiCode::BadParameter.code());
                };
                let area = rect(&args, 3)?;
                let pen_color = get_color_or(&args, 7, None)?;
                let pen_style = get_int_or(&args, 8, 0)?;
                if PenStyle::from_code(pen_style).is_none() {
                    return Ok(ApiCode::PenStyleNotValid.code());
                }
                let pen_width = get_number_or(&args, 9, 1.0)?;
                let brush_color = get_color_or(&args, 10, None)?;
                let brush_style = get_int_or(&args, 11, 0)?;
                if BrushStyle::from_code(brush_style).is_none() {
                    return Ok(ApiCode::BrushStyleNotValid.code());
                }
                let extra = [
                    get_number_or(&args, 12, 0.0)?,
                    get_number_or(&args, 13, 0.0)?,
                    get_number_or(&args, 14, 0.0)?,
                    get_number_or(&args, 15, 0.0)?,
                ];
                Ok(ctx
                    .host
                    .borrow_mut()
                    .window_circle_op(
                        &name,
                        op,
                        area,
                        pen_color,
                        pen_style,
                        pen_width,
                        brush_color,
                        brush_style,
                        extra,
                    )
                    .code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "WindowLine",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 8, "WindowLine")?;
                let name = get_string(&args, 1)?;
                let x1 = get_number_or(&args, 2, 0.0)?;
                let y1 = get_number_or(&args, 3, 0.0)?;
                let x2 = get_number_or(&args, 4, 0.0)?;
                let y2 = get_number_or(&args, 5, 0.0)?;
                let pen_color = get_color_or(&args, 6, None)?;
                let pen_style = get_int_or(&args, 7, 0)?;
                if PenStyle::from_code(pen_style).is_none() {
                    return Ok(ApiCode::PenStyleNotValid.code());
                }
                let pen_width = get_number_or(&args, 8, 1.0)?;
                Ok(ctx
                    .host
                    .borrow_mut()
                    .window_line(&name, x1, y1, x2, y2, pen_color, pen_style, pen_width)
                    .code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "WindowText",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 9, "WindowText")?;
                let name = get_string(&args, 1)?;
                let font_id = get_string(&args, 2)?;
                let text = get_string_or(&args, 3, "")?;
                let area = rect(&args, 4)?;
                let color = get_color_or(&args, 8, None)?;
                let unicode = get_bool_or(&args, 9, false)?;
                Ok(
                    match ctx
                        .host
                        .borrow_mut()
                        .window_text(&name, &font_id, &text, area, color, unicode)
                    {
                        Ok(width) => width,
                        Err(code) => i64::from(code.code()),
                    },
                )
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "WindowTextWidth",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 4, "WindowTextWidth")?;
                let name = get_string(&args, 1)?;
                let font_id = get_string(&args, 2)?;
                let text = get_string_or(&args, 3, "")?;
                let unicode = get_bool_or(&args, 4, false)?;
                Ok(
                    match ctx
                        .host
                        .borrow()
                        .window_text_width(&name, &font_id, &text, unicode)
                    {
                        Ok(width) => width,
                        Err(code) => i64::from(code.code()),
                    },
                )
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "WindowFont",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 10, "WindowFont")?;
                let name = get_string(&args, 1)?;
                let font_id = get_string(&args, 2)?;
                let font_name = get_string_or(&args, 3, "")?;
                let size = get_number_or(&args, 4, 0.0)?;
                let bold = get_bool_or(&args, 5, false)?;
                let italic = get_bool_or(&args, 6, false)?;
                let underline = get_bool_or(&args, 7, false)?;
                let strikeout = get_bool_or(&args, 8, false)?;
                let charset = get_int_or(&args, 9, 1)?;
                let pitch_and_family = get_int_or(&args, 10, 0)?;
                Ok(ctx
                    .host
                    .borrow_mut()
                    .window_font(
                        &name,
                        &font_id,
                        &font_name,
                        size,
                        bold,
                        italic,
                        underline,
                        strikeout,
                        charset,
                        pitch_and_family,
                    )
                    .code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "WindowLoadImage",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 3, "WindowLoadImage")?;
                let name = get_string(&args, 1)?;
                let image_id = get_string(&args, 2)?;
                let path = get_string(&args, 3)?;
                Ok(ctx
                    .host
                    .borrow_mut()
                    .window_load_image(&name, &image_id, &path)
                    .code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "WindowDrawImage",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 11, "WindowDrawImage")?;
                let name = get_string(&args, 1)?;
                let image_id = get_string(&args, 2)?;
                let dest = rect(&args, 3)?;
                let mode = get_int_or(&args, 7, 1)?;
                let src = rect(&args, 8)?;
                Ok(ctx
                    .host
                    .borrow_mut()
                    .window_draw_image(&name, &image_id, dest, mode, src)
                    .code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "WindowFilter",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 7, "WindowFilter")?;
                let name = get_string(&args, 1)?;
                let area = rect(&args, 2)?;
                let operation = get_int(&args, 6)?;
                let options = get_number_or(&args, 7, 0.0)?;
                Ok(ctx
                    .host
                    .borrow_mut()
                    .window_filter(&name, area, operation, options)
                    .code())
            })?,
        )?;
    }

    // --- hotspots ----------------------------------------------------

    {
        let ctx = ctx.clone();
        globals.set(
            "WindowAddHotspot",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 14, "WindowAddHotspot")?;
                if !ctx.enabled() {
                    return Ok(ApiCode::PluginDisabled.code());
                }
                let name = get_string(&args, 1)?;
                let Some(cursor) = CursorShape::from_code(get_int_or(&args, 13, 0)?) else {
                    return Ok(ApiCode::BadParameter.code());
                };
                let spec = HotspotSpec {
                    id: get_string(&args, 2)?,
                    rect: rect(&args, 3)?,
                    mouse_over: get_string_or(&args, 7, "")?,
                    cancel_mouse_over: get_string_or(&args, 8, "")?,
                    mouse_down: get_string_or(&args, 9, "")?,
                    cancel_mouse_down: get_string_or(&args, 10, "")?,
                    mouse_up: get_string_or(&args, 11, "")?,
                    tooltip: get_string_or(&args, 12, "")?,
                    cursor,
                    flags: get_int_or(&args, 14, 0)?,
                };
                Ok(ctx
                    .host
                    .borrow_mut()
                    .window_add_hotspot(&name, ctx.index, spec)
                    .code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "WindowMoveHotspot",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 6, "WindowMoveHotspot")?;
                let name = get_string(&args, 1)?;
                let hotspot_id = get_string(&args, 2)?;
                let area = rect(&args, 3)?;
                Ok(ctx
                    .host
                    .borrow_mut()
                    .window_move_hotspot(&name, &hotspot_id, area)
                    .code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "WindowDeleteHotspot",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 2, "WindowDeleteHotspot")?;
                let name = get_string(&args, 1)?;
                let hotspot_id = get_string(&args, 2)?;
                Ok(ctx
                    .host
                    .borrow_mut()
                    .window_delete_hotspot(&name, &hotspot_id)
                    .code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "WindowDeleteAllHotspots",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 1, "WindowDeleteAllHotspots")?;
                let name = get_string(&args, 1)?;
                Ok(ctx.host.borrow_mut().window_delete_all_hotspots(&name).code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "WindowDragHandler",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 5, "WindowDragHandler")?;
                if !ctx.enabled() {
                    return Ok(ApiCode::PluginDisabled.code());
                }
                let name = get_string(&args, 1)?;
                let hotspot_id = get_string(&args, 2)?;
                let move_routine = get_string_or(&args, 3, "")?;
                let release_routine = get_string_or(&args, 4, "")?;
                let flags = get_int_or(&args, 5, 0)?;
                Ok(ctx
                    .host
                    .borrow_mut()
                    .window_drag_handler(&name, &hotspot_id, &move_routine, &release_routine, flags)
                    .code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "WindowScrollwheelHandler",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 3, "WindowScrollwheelHandler")?;
                let name = get_string(&args, 1)?;
                let hotspot_id = get_string(&args, 2)?;
                let routine = get_string_or(&args, 3, "")?;
                Ok(ctx
                    .host
                    .borrow_mut()
                    .window_scrollwheel_handler(&name, &hotspot_id, &routine)
                    .code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "WindowHotspotTooltip",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 3, "WindowHotspotTooltip")?;
                let name = get_string(&args, 1)?;
                let hotspot_id = get_string(&args, 2)?;
                let tooltip = get_string_or(&args, 3, "")?;
                Ok(ctx
                    .host
                    .borrow_mut()
                    .window_hotspot_tooltip(&name, &hotspot_id, &tooltip)
                    .code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "WindowList",
            lua.create_function(move |lua, ()| {
                lua.create_sequence_from(ctx.host.borrow().window_list())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "WindowInfo",
            lua.create_function(move |lua, args: MultiValue| {
                expect_max_args(&args, 2, "WindowInfo")?;
                let name = get_string(&args, 1)?;
                let code = get_int(&args, 2)?;
                match ctx.host.borrow().window_info(&name, code) {
                    Ok(value) => value.into_lua(lua),
                    Err(_) => Ok(Value::Nil),
                }
            })?,
        )?;
    }

    Ok(())
}
