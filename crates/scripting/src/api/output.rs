//! Output and colour functions: notes, tells, hyperlinks, status line,
//! titles, note-colour state, palette access.

use std::cell::Cell;
use std::rc::Rc;

use mlua::{Lua, MultiValue, Result as LuaResult, Table};
use mudlark_core::color::{code_of, named_color};
use mudlark_core::{ApiCode, Color};

use crate::marshal::{
    concat_strings, expect_max_args, get_bool_or, get_color_or, get_int, get_int_or,
    get_string, get_string_or,
};

use super::ApiContext;

/// Default colours applied by Note/Tell, adjustable from script. Lives on
/// the interpreter, so a reset returns to "no colour".
#[derive(Clone, Default)]
struct NoteColors {
    fore: Rc<Cell<Option<Color>>>,
    back: Rc<Cell<Option<Color>>>,
}

pub(super) fn register(lua: &Lua, globals: &Table, ctx: &ApiContext) -> LuaResult<()> {
    let note_colors = NoteColors::default();

    {
        let ctx = ctx.clone();
        let colors = note_colors.clone();
        globals.set(
            "Note",
            lua.create_function(move |_, args: MultiValue| {
                ctx.host.borrow_mut().print_note(
                    &concat_strings(&args),
                    colors.fore.get(),
                    colors.back.get(),
                );
                Ok(())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        let colors = note_colors.clone();
        globals.set(
            "Tell",
            lua.create_function(move |_, args: MultiValue| {
                ctx.host.borrow_mut().print_tell(
                    &concat_strings(&args),
                    colors.fore.get(),
                    colors.back.get(),
                );
                Ok(())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "ColourNote",
            lua.create_function(move |_, args: MultiValue| {
                let mut host = ctx.host.borrow_mut();
                for (fore, back, text) in colour_triples(&args)? {
                    host.print_tell(&text, fore, back);
                }
                host.print_note("", None, None);
                Ok(())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "ColourTell",
            lua.create_function(move |_, args: MultiValue| {
                let mut host = ctx.host.borrow_mut();
                for (fore, back, text) in colour_triples(&args)? {
                    host.print_tell(&text, fore, back);
                }
                Ok(())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "AnsiNote",
            lua.create_function(move |_, args: MultiValue| {
                ctx.host.borrow_mut().print_ansi(&concat_strings(&args));
                Ok(())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "Simulate",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 1, "Simulate")?;
                let text = crate::marshal::get_bytes_or(&args, 1, b"")?;
                ctx.host.borrow_mut().simulate(&text);
                Ok(())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "Hyperlink",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 7, "Hyperlink")?;
                let action = get_string(&args, 1)?;
                let text = get_string_or(&args, 2, &action)?;
                let hint = get_string_or(&args, 3, "")?;
                let fore = get_color_or(&args, 4, None)?;
                let back = get_color_or(&args, 5, None)?;
                let url = get_bool_or(&args, 6, false)?;
                let no_underline = get_bool_or(&args, 7, false)?;
                ctx.host
                    .borrow_mut()
                    .hyperlink(&action, &text, &hint, fore, back, url, no_underline);
                Ok(())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "SetStatus",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 1, "SetStatus")?;
                ctx.host.borrow_mut().set_status(&get_string_or(&args, 1, "")?);
                Ok(())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "SetTitle",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 1, "SetTitle")?;
                ctx.host.borrow_mut().set_title(&get_string_or(&args, 1, "")?);
                Ok(())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "SetMainTitle",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 1, "SetMainTitle")?;
                ctx.host
                    .borrow_mut()
                    .set_main_title(&get_string_or(&args, 1, "")?);
                Ok(())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "GetLinesInBufferCount",
            lua.create_function(move |_, ()| Ok(ctx.host.borrow().lines_in_buffer()))?,
        )?;
    }

    // --- note colour state -------------------------------------------

    {
        let colors = note_colors.clone();
        globals.set(
            "GetNoteColourFore",
            lua.create_function(move |_, ()| Ok(code_of(colors.fore.get())))?,
        )?;
    }
    {
        let colors = note_colors.clone();
        globals.set(
            "GetNoteColourBack",
            lua.create_function(move |_, ()| Ok(code_of(colors.back.get())))?,
        )?;
    }
    {
        let colors = note_colors.clone();
        globals.set(
            "SetNoteColourFore",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 1, "SetNoteColourFore")?;
                colors.fore.set(Color::from_code(get_int(&args, 1)?));
                Ok(())
            })?,
        )?;
    }
    {
        let colors = note_colors.clone();
        globals.set(
            "SetNoteColourBack",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 1, "SetNoteColourBack")?;
                colors.back.set(Color::from_code(get_int(&args, 1)?));
                Ok(())
            })?,
        )?;
    }
    {
        let colors = note_colors.clone();
        globals.set(
            "NoteColourName",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 2, "NoteColourName")?;
                colors.fore.set(named_color(&get_string(&args, 1)?));
                colors.back.set(named_color(&get_string_or(&args, 2, "")?));
                Ok(())
            })?,
        )?;
    }
    {
        let colors = note_colors;
        globals.set(
            "NoteColourRGB",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 2, "NoteColourRGB")?;
                colors.fore.set(Color::from_code(get_int(&args, 1)?));
                colors.back.set(Color::from_code(get_int_or(&args, 2, -1)?));
                Ok(())
            })?,
        )?;
    }

    // --- colour helpers ----------------------------------------------

    globals.set(
        "ColourNameToRGB",
        lua.create_function(|_, args: MultiValue| {
            expect_max_args(&args, 1, "ColourNameToRGB")?;
            Ok(code_of(named_color(&get_string(&args, 1)?)))
        })?,
    )?;
    globals.set(
        "RGBColourToName",
        lua.create_function(|_, args: MultiValue| {
            expect_max_args(&args, 1, "RGBColourToName")?;
            Ok(match Color::from_code(get_int(&args, 1)?) {
                Some(color) => color.hex_name(),
                None => String::new(),
            })
        })?,
    )?;
    globals.set(
        "AdjustColour",
        lua.create_function(|_, args: MultiValue| {
            expect_max_args(&args, 2, "AdjustColour")?;
            let code = get_int(&args, 1)?;
            let method = get_int_or(&args, 2, 1)?;
            Ok(match Color::from_code(code) {
                Some(color) => adjust_colour(color, method).to_code(),
                None => code,
            })
        })?,
    )?;

    // --- ANSI palette ------------------------------------------------

    {
        let ctx = ctx.clone();
        globals.set(
            "GetNormalColour",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 1, "GetNormalColour")?;
                let index = get_int(&args, 1)?;
                Ok(code_of(palette_slot(index).and_then(|slot| {
                    ctx.host.borrow().palette_color(false, slot)
                })))
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "GetBoldColour",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 1, "GetBoldColour")?;
                let index = get_int(&args, 1)?;
                Ok(code_of(palette_slot(index).and_then(|slot| {
                    ctx.host.borrow().palette_color(true, slot)
                })))
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "SetNormalColour",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 2, "SetNormalColour")?;
                Ok(set_palette(&ctx, false, &args)?.code())
            })?,
        )?;
    }
    {
        let ctx = ctx.clone();
        globals.set(
            "SetBoldColour",
            lua.create_function(move |_, args: MultiValue| {
                expect_max_args(&args, 2, "SetBoldColour")?;
                Ok(set_palette(&ctx, true, &args)?.code())
            })?,
        )?;
    }

    Ok(())
}

/// ANSI palette indices are 1-based in script, 16 slots.
fn palette_slot(index: i64) -> Option<usize> {
    if (1..=16).contains(&index) {
        Some((index - 1) as usize)
    } else {
        None
    }
}

fn set_palette(ctx: &ApiContext, bold: bool, args: &MultiValue) -> LuaResult<ApiCode> {
    if !ctx.enabled() {
        return Ok(ApiCode::PluginDisabled);
    }
    let Some(slot) = palette_slot(get_int(args, 1)?) else {
        return Ok(ApiCode::OptionOutOfRange);
    };
    let Some(color) = Color::from_code(get_int(args, 2)?) else {
        return Ok(ApiCode::BadParameter);
    };
    Ok(ctx.host.borrow_mut().set_palette_color(bold, slot, color))
}

/// Decode (fore-name, back-name, text) triples. A trailing partial triple
/// is padded with defaults.
fn colour_triples(
    args: &MultiValue,
) -> LuaResult<Vec<(Option<Color>, Option<Color>, String)>> {
    let mut triples = Vec::with_capacity(args.len().div_ceil(3));
    let mut position = 1;
    while position <= args.len() {
        let fore = get_color_or(args, position, None)?;
        let back = get_color_or(args, position + 1, None)?;
        let text = get_string_or(args, position + 2, "")?;
        triples.push((fore, back, text));
        position += 3;
    }
    Ok(triples)
}

/// Legacy colour adjustments: 1 invert, 2 lighter, 3 darker, 4 grayscale.
fn adjust_colour(color: Color, method: i64) -> Color {
    match method {
        1 => Color::new(255 - color.r, 255 - color.g, 255 - color.b),
        2 => Color::new(
            color.r.saturating_add((255 - color.r) / 4),
            color.g.saturating_add((255 - color.g) / 4),
            color.b.saturating_add((255 - color.b) / 4),
        ),
        3 => Color::new(
            color.r - color.r / 4,
            color.g - color.g / 4,
            color.b - color.b / 4,
        ),
        4 => {
            let luma = (u16::from(color.r) * 30 + u16::from(color.g) * 59
                + u16::from(color.b) * 11)
                / 100;
            let luma = luma as u8;
            Color::new(luma, luma, luma)
        }
        _ => color,
    }
}
