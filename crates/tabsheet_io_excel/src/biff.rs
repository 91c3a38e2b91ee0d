//! BIFF8 record encoders for the `.xls` writer.
//!
//! Every record is `id: u16 | len: u16 | data[len]`, little-endian, with
//! `len <= 8224`. Only the records needed for a single plain worksheet are
//! provided: workbook globals (BOF, CODEPAGE, WINDOW1, FONT, XF, STYLE,
//! BOUNDSHEET8, SST/CONTINUE, EOF) and worksheet content (WSBOOL, DIMENSIONS,
//! NUMBER, LABELSST, BOOLERR, BLANK, WINDOW2).

pub const RECORD_BOF: u16 = 0x0809;
pub const RECORD_EOF: u16 = 0x000A;
pub const RECORD_CODEPAGE: u16 = 0x0042;
pub const RECORD_WINDOW1: u16 = 0x003D;
pub const RECORD_FONT: u16 = 0x0031;
pub const RECORD_XF: u16 = 0x00E0;
pub const RECORD_STYLE: u16 = 0x0293;
pub const RECORD_BOUNDSHEET: u16 = 0x0085;
pub const RECORD_SST: u16 = 0x00FC;
pub const RECORD_CONTINUE: u16 = 0x003C;
pub const RECORD_WSBOOL: u16 = 0x0081;
pub const RECORD_DIMENSIONS: u16 = 0x0200;
pub const RECORD_WINDOW2: u16 = 0x023E;
pub const RECORD_NUMBER: u16 = 0x0203;
pub const RECORD_LABELSST: u16 = 0x00FD;
pub const RECORD_BOOLERR: u16 = 0x0205;
pub const RECORD_BLANK: u16 = 0x0201;

/// BOF substream type: workbook globals.
pub const BOF_DT_WORKBOOK_GLOBALS: u16 = 0x0005;
/// BOF substream type: worksheet.
pub const BOF_DT_WORKSHEET: u16 = 0x0010;

/// Maximum payload of one record; longer data continues in CONTINUE records.
pub const N_LEN_RECORD_DATA_MAX: usize = 8224;
/// Unicode (UTF-16LE) code page identifier.
pub const N_CODEPAGE_UTF16: u16 = 0x04B0;

const N_BIFF8_VERSION: u16 = 0x0600;
const N_COLOR_AUTOMATIC: u16 = 0x7FFF;
const N_XF_FILL_PALETTE_DEFAULT: u16 = 0x20C0;

////////////////////////////////////////////////////////////////////////////////
// #region RecordFraming

/// Append one record to `out`.
pub fn push_record(out: &mut Vec<u8>, id: u16, data: &[u8]) {
    debug_assert!(data.len() <= N_LEN_RECORD_DATA_MAX);
    out.extend_from_slice(&id.to_le_bytes());
    out.extend_from_slice(&(data.len() as u16).to_le_bytes());
    out.extend_from_slice(data);
}

/// Encode text as `(is_16bit, bytes)`: compressed 8-bit for ASCII, UTF-16LE otherwise.
fn encode_biff8_chars(text: &str) -> (bool, Vec<u8>) {
    if text.is_ascii() {
        return (false, text.as_bytes().to_vec());
    }
    let v_bytes = text
        .encode_utf16()
        .flat_map(|unit| unit.to_le_bytes())
        .collect();
    (true, v_bytes)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WorkbookGlobals

/// BOF for the given substream type.
pub fn write_bof(out: &mut Vec<u8>, substream_type: u16) {
    let mut data = [0u8; 16];
    data[0..2].copy_from_slice(&N_BIFF8_VERSION.to_le_bytes());
    data[2..4].copy_from_slice(&substream_type.to_le_bytes());
    data[4..6].copy_from_slice(&0x0DBBu16.to_le_bytes()); // build
    data[6..8].copy_from_slice(&0x07CCu16.to_le_bytes()); // year 1996
    data[12..16].copy_from_slice(&0x0000_0006u32.to_le_bytes()); // lowest BIFF version
    push_record(out, RECORD_BOF, &data);
}

/// EOF closing the current substream.
pub fn write_eof(out: &mut Vec<u8>) {
    push_record(out, RECORD_EOF, &[]);
}

/// CODEPAGE.
pub fn write_codepage(out: &mut Vec<u8>, codepage: u16) {
    push_record(out, RECORD_CODEPAGE, &codepage.to_le_bytes());
}

/// WINDOW1 with default geometry, first tab active and selected.
pub fn write_window1(out: &mut Vec<u8>) {
    let mut data = [0u8; 18];
    data[4..6].copy_from_slice(&0x3000u16.to_le_bytes()); // dxWn
    data[6..8].copy_from_slice(&0x1E00u16.to_le_bytes()); // dyWn
    data[8..10].copy_from_slice(&0x0038u16.to_le_bytes()); // grbit
    data[14..16].copy_from_slice(&1u16.to_le_bytes()); // ctabSel
    data[16..18].copy_from_slice(&0x0258u16.to_le_bytes()); // wTabRatio
    push_record(out, RECORD_WINDOW1, &data);
}

/// FONT with regular weight and automatic color. `name` must be ASCII.
pub fn write_font(out: &mut Vec<u8>, name: &str, height_twips: u16) {
    let v_name = name.as_bytes();
    let n_len_name = v_name.len().min(u8::MAX as usize);

    let mut data = Vec::with_capacity(16 + n_len_name);
    data.extend_from_slice(&height_twips.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes()); // option flags
    data.extend_from_slice(&N_COLOR_AUTOMATIC.to_le_bytes());
    data.extend_from_slice(&400u16.to_le_bytes()); // weight
    data.extend_from_slice(&0u16.to_le_bytes()); // escapement
    data.extend_from_slice(&[0, 0, 0, 0]); // underline, family, charset, reserved
    data.push(n_len_name as u8);
    data.push(0x00); // compressed
    data.extend_from_slice(&v_name[..n_len_name]);
    push_record(out, RECORD_FONT, &data);
}

/// XF with General alignment and no borders.
///
/// Style XFs get parent `0xFFF` and the style bit; cell XFs inherit style XF 0.
pub fn write_xf(out: &mut Vec<u8>, font_idx: u16, fmt_idx: u16, is_style_xf: bool) {
    let mut data = [0u8; 20];
    data[0..2].copy_from_slice(&font_idx.to_le_bytes());
    data[2..4].copy_from_slice(&fmt_idx.to_le_bytes());
    let n_type_prot: u16 = if is_style_xf { 0xFFF5 } else { 0x0001 };
    data[4..6].copy_from_slice(&n_type_prot.to_le_bytes());
    data[6] = 0x20; // horizontal general, vertical bottom
    data[18..20].copy_from_slice(&N_XF_FILL_PALETTE_DEFAULT.to_le_bytes());
    push_record(out, RECORD_XF, &data);
}

/// Built-in STYLE record binding `Normal` to style XF 0.
pub fn write_style_normal(out: &mut Vec<u8>) {
    let n_xf_field: u16 = 0x8000; // built-in flag, XF index 0
    let mut data = [0u8; 4];
    data[0..2].copy_from_slice(&n_xf_field.to_le_bytes());
    data[2] = 0x00; // Normal
    data[3] = 0xFF; // no outline level
    push_record(out, RECORD_STYLE, &data);
}

/// BOUNDSHEET8 for a visible worksheet with a placeholder stream offset.
///
/// Returns the byte offset of the `lbPlyPos` field inside `out`, to be filled
/// with [`patch_boundsheet_position`] once the worksheet BOF position is known.
pub fn write_boundsheet(out: &mut Vec<u8>, name: &str) -> usize {
    let c_name: String = name.chars().take(31).collect();
    let (is_16bit, v_chars) = encode_biff8_chars(&c_name);
    let n_cch = c_name.encode_utf16().count() as u8;

    let mut data = Vec::with_capacity(8 + v_chars.len());
    data.extend_from_slice(&0u32.to_le_bytes()); // lbPlyPos placeholder
    data.extend_from_slice(&0u16.to_le_bytes()); // visible worksheet
    data.push(n_cch);
    data.push(u8::from(is_16bit));
    data.extend_from_slice(&v_chars);

    let n_offset_position = out.len() + 4;
    push_record(out, RECORD_BOUNDSHEET, &data);
    n_offset_position
}

/// Fill a BOUNDSHEET8 `lbPlyPos` placeholder.
pub fn patch_boundsheet_position(out: &mut [u8], offset_field: usize, position: u32) {
    out[offset_field..offset_field + 4].copy_from_slice(&position.to_le_bytes());
}

/// SST followed by as many CONTINUE records as needed.
///
/// String headers (`cch`, flags) never straddle a record boundary. When the
/// character data of one string does, the CONTINUE record restarts with the
/// string's option byte, and UTF-16 code units are never split.
pub fn write_sst(out: &mut Vec<u8>, strings: &[String], cst_total: u32) {
    let mut l_records: Vec<Vec<u8>> = Vec::new();
    let mut v_current: Vec<u8> = Vec::with_capacity(N_LEN_RECORD_DATA_MAX);

    v_current.extend_from_slice(&cst_total.to_le_bytes());
    v_current.extend_from_slice(&(strings.len() as u32).to_le_bytes());

    for c_text in strings {
        let (is_16bit, v_chars) = encode_biff8_chars(c_text);
        let n_unit = if is_16bit { 2 } else { 1 };
        let n_cch = (v_chars.len() / n_unit) as u16;

        if N_LEN_RECORD_DATA_MAX - v_current.len() < 3 {
            l_records.push(std::mem::take(&mut v_current));
        }
        v_current.extend_from_slice(&n_cch.to_le_bytes());
        v_current.push(u8::from(is_16bit));

        let mut n_offset = 0;
        while n_offset < v_chars.len() {
            let n_room = (N_LEN_RECORD_DATA_MAX - v_current.len()) / n_unit * n_unit;
            if n_room == 0 {
                l_records.push(std::mem::take(&mut v_current));
                v_current.push(u8::from(is_16bit));
                continue;
            }
            let n_take = n_room.min(v_chars.len() - n_offset);
            v_current.extend_from_slice(&v_chars[n_offset..n_offset + n_take]);
            n_offset += n_take;
        }
    }
    l_records.push(v_current);

    for (idx, data) in l_records.iter().enumerate() {
        let n_id = if idx == 0 { RECORD_SST } else { RECORD_CONTINUE };
        push_record(out, n_id, data);
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WorksheetContent

/// WSBOOL with normal worksheet defaults.
pub fn write_wsbool(out: &mut Vec<u8>) {
    push_record(out, RECORD_WSBOOL, &0x04C1u16.to_le_bytes());
}

/// DIMENSIONS; `row_last` and `col_last` are exclusive bounds.
pub fn write_dimensions(
    out: &mut Vec<u8>,
    row_first: u32,
    row_last: u32,
    col_first: u16,
    col_last: u16,
) {
    let mut data = [0u8; 14];
    data[0..4].copy_from_slice(&row_first.to_le_bytes());
    data[4..8].copy_from_slice(&row_last.to_le_bytes());
    data[8..10].copy_from_slice(&col_first.to_le_bytes());
    data[10..12].copy_from_slice(&col_last.to_le_bytes());
    push_record(out, RECORD_DIMENSIONS, &data);
}

/// WINDOW2 for the active, selected worksheet with gridlines and headings.
pub fn write_window2(out: &mut Vec<u8>) {
    let mut data = [0u8; 18];
    data[0..2].copy_from_slice(&0x06B6u16.to_le_bytes()); // grbit
    data[6..8].copy_from_slice(&0x0040u16.to_le_bytes()); // icvHdr
    push_record(out, RECORD_WINDOW2, &data);
}

fn encode_cell_prefix(data: &mut Vec<u8>, row: u16, col: u16, xf_idx: u16) {
    data.extend_from_slice(&row.to_le_bytes());
    data.extend_from_slice(&col.to_le_bytes());
    data.extend_from_slice(&xf_idx.to_le_bytes());
}

/// NUMBER cell.
pub fn write_number(out: &mut Vec<u8>, row: u16, col: u16, xf_idx: u16, value: f64) {
    let mut data = Vec::with_capacity(14);
    encode_cell_prefix(&mut data, row, col, xf_idx);
    data.extend_from_slice(&value.to_le_bytes());
    push_record(out, RECORD_NUMBER, &data);
}

/// LABELSST cell referencing SST entry `sst_idx`.
pub fn write_labelsst(out: &mut Vec<u8>, row: u16, col: u16, xf_idx: u16, sst_idx: u32) {
    let mut data = Vec::with_capacity(10);
    encode_cell_prefix(&mut data, row, col, xf_idx);
    data.extend_from_slice(&sst_idx.to_le_bytes());
    push_record(out, RECORD_LABELSST, &data);
}

/// BOOLERR cell holding a boolean.
pub fn write_boolerr(out: &mut Vec<u8>, row: u16, col: u16, xf_idx: u16, value: bool) {
    let mut data = Vec::with_capacity(8);
    encode_cell_prefix(&mut data, row, col, xf_idx);
    data.push(u8::from(value));
    data.push(0x00); // boolean, not error
    push_record(out, RECORD_BOOLERR, &data);
}

/// BLANK cell.
pub fn write_blank(out: &mut Vec<u8>, row: u16, col: u16, xf_idx: u16) {
    let mut data = Vec::with_capacity(6);
    encode_cell_prefix(&mut data, row, col, xf_idx);
    push_record(out, RECORD_BLANK, &data);
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
