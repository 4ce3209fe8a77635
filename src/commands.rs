//! ILI9341 opcodes and the byte-coded command table runner.
//!
//! Table layout, repeated until the `END_OF_TABLE` opcode:
//!
//! ```text
//! opcode, n | DELAY_FLAG?, arg0 .. arg(n-1), [delay_ms]
//! ```
//!
//! A delay byte of `0xFF` stands for 500 ms.

use display_interface::{DataFormat, DisplayError, WriteOnlyDataCommand};
use embedded_hal::delay::DelayNs;

use crate::config::{MADCTL_BGR, MADCTL_MX};

pub const NOP: u8 = 0x00;
pub const SWRESET: u8 = 0x01;

pub const SLPOUT: u8 = 0x11;

pub const INVOFF: u8 = 0x20;
pub const INVON: u8 = 0x21;
pub const GAMMASET: u8 = 0x26;
pub const DISPOFF: u8 = 0x28;
pub const DISPON: u8 = 0x29;

pub const CASET: u8 = 0x2A;
pub const PASET: u8 = 0x2B;
pub const RAMWR: u8 = 0x2C;

pub const VSCRSADD: u8 = 0x37;
pub const MADCTL: u8 = 0x36;
pub const PIXFMT: u8 = 0x3A;

pub const FRMCTR1: u8 = 0xB1;
pub const DFUNCTR: u8 = 0xB6;

pub const PWCTR1: u8 = 0xC0;
pub const PWCTR2: u8 = 0xC1;
pub const VMCTR1: u8 = 0xC5;
pub const VMCTR2: u8 = 0xC7;
pub const POWERA: u8 = 0xCB;
pub const POWERB: u8 = 0xCF;

pub const GMCTRP1: u8 = 0xE0;
pub const GMCTRN1: u8 = 0xE1;
pub const DTCA: u8 = 0xE8;
pub const DTCB: u8 = 0xEA;
pub const POWER_SEQ: u8 = 0xED;
pub const GAMMA3_EN: u8 = 0xF2;
pub const PRC: u8 = 0xF7;

/// Bit 7 of the argument count: a delay byte follows the arguments.
pub const DELAY_FLAG: u8 = 0x80;
/// Table terminator.
pub const END_OF_TABLE: u8 = NOP;

const DELAY_ESCAPE: u8 = 0xFF;
const DELAY_ESCAPE_MS: u32 = 500;

/// Power-on sequence for a bare ILI9341 (RGB565, BGR, portrait scan).
#[rustfmt::skip]
pub const INIT_SEQUENCE: &[u8] = &[
    SWRESET, DELAY_FLAG, 150,
    0xEF, 3, 0x03, 0x80, 0x02,
    POWERB, 3, 0x00, 0xC1, 0x30,
    POWER_SEQ, 4, 0x64, 0x03, 0x12, 0x81,
    DTCA, 3, 0x85, 0x00, 0x78,
    POWERA, 5, 0x39, 0x2C, 0x00, 0x34, 0x02,
    PRC, 1, 0x20,
    DTCB, 2, 0x00, 0x00,
    PWCTR1, 1, 0x23,                // VRH[5:0]
    PWCTR2, 1, 0x10,                // SAP[2:0], BT[3:0]
    VMCTR1, 2, 0x3E, 0x28,
    VMCTR2, 1, 0x86,
    MADCTL, 1, MADCTL_MX | MADCTL_BGR,
    VSCRSADD, 1, 0x00,
    PIXFMT, 1, 0x55,                // 16 bpp
    FRMCTR1, 2, 0x00, 0x18,
    DFUNCTR, 3, 0x08, 0x82, 0x27,
    GAMMA3_EN, 1, 0x00,
    GAMMASET, 1, 0x01,
    GMCTRP1, 15, 0x0F, 0x31, 0x2B, 0x0C, 0x0E, 0x08, 0x4E, 0xF1,
                 0x37, 0x07, 0x10, 0x03, 0x0E, 0x09, 0x00,
    GMCTRN1, 15, 0x00, 0x0E, 0x14, 0x03, 0x11, 0x07, 0x31, 0xC1,
                 0x48, 0x08, 0x0F, 0x0C, 0x31, 0x36, 0x0F,
    SLPOUT, DELAY_FLAG, DELAY_ESCAPE,
    END_OF_TABLE,
];

/// One command frame: opcode with D/C low, then `args` with D/C high.
pub fn write_command<DI>(di: &mut DI, cmd: u8, args: &[u8]) -> Result<(), DisplayError>
where
    DI: WriteOnlyDataCommand,
{
    di.send_commands(DataFormat::U8(&[cmd]))?;
    if !args.is_empty() {
        di.send_data(DataFormat::U8(args))?;
    }
    Ok(())
}

/// Replay a command table. Returns how many commands were sent.
///
/// Stops at `END_OF_TABLE`, or at the end of `table` if the terminator is
/// missing. The first bus error aborts the run.
pub fn run_command_list<DI, D>(
    di: &mut DI,
    delay: &mut D,
    table: &[u8],
) -> Result<usize, DisplayError>
where
    DI: WriteOnlyDataCommand,
    D: DelayNs,
{
    let mut pos = 0usize;
    let mut sent = 0usize;

    while let Some(&cmd) = table.get(pos) {
        if cmd == END_OF_TABLE {
            return Ok(sent);
        }
        let Some(&count) = table.get(pos + 1) else { break };
        let nargs = usize::from(count & !DELAY_FLAG);
        let Some(args) = table.get(pos + 2..pos + 2 + nargs) else { break };
        pos += 2 + nargs;

        write_command(di, cmd, args)?;
        sent += 1;

        if count & DELAY_FLAG != 0 {
            let Some(&ms) = table.get(pos) else { break };
            pos += 1;
            let ms = if ms == DELAY_ESCAPE { DELAY_ESCAPE_MS } else { u32::from(ms) };
            delay.delay_ms(ms);
        }
    }

    log_warn!("command table ended without terminator at byte {} ({} sent)", pos, sent);
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Frame, MockDelay, MockPanel};

    #[test]
    fn frames_follow_table_order() {
        let table = [SWRESET, DELAY_FLAG, 5, PIXFMT, 1, 0x55, CASET, 4, 0, 0, 0, 9, END_OF_TABLE];
        let mut bus = MockPanel::new(16, 16);
        let mut delay = MockDelay::default();

        let sent = run_command_list(&mut bus, &mut delay, &table).unwrap();

        assert_eq!(sent, 3);
        assert_eq!(
            bus.frames,
            vec![
                Frame::Command(SWRESET),
                Frame::Command(PIXFMT),
                Frame::Data(vec![0x55]),
                Frame::Command(CASET),
                Frame::Data(vec![0, 0, 0, 9]),
            ]
        );
        assert_eq!(delay.ms, vec![5]);
    }

    #[test]
    fn escape_delay_is_500ms() {
        let table = [SLPOUT, DELAY_FLAG, 0xFF, DISPON, DELAY_FLAG | 1, 0x00, 20, END_OF_TABLE];
        let mut bus = MockPanel::new(16, 16);
        let mut delay = MockDelay::default();

        run_command_list(&mut bus, &mut delay, &table).unwrap();

        assert_eq!(delay.ms, vec![500, 20]);
        assert_eq!(bus.frames.last(), Some(&Frame::Data(vec![0x00])));
    }

    #[test]
    fn terminator_stops_early() {
        let table = [DISPON, 0, END_OF_TABLE, DISPOFF, 0];
        let mut bus = MockPanel::new(16, 16);
        let mut delay = MockDelay::default();

        assert_eq!(run_command_list(&mut bus, &mut delay, &table).unwrap(), 1);
        assert_eq!(bus.frames, vec![Frame::Command(DISPON)]);
    }

    #[test]
    fn truncated_table_sends_complete_commands_only() {
        // second command claims 4 args but only 2 are present
        let table = [DISPON, 0, CASET, 4, 0x00, 0x01];
        let mut bus = MockPanel::new(16, 16);
        let mut delay = MockDelay::default();

        assert_eq!(run_command_list(&mut bus, &mut delay, &table).unwrap(), 1);
        assert_eq!(bus.frames, vec![Frame::Command(DISPON)]);
    }

    #[test]
    fn bus_error_aborts() {
        let mut bus = MockPanel::new(16, 16);
        bus.fail_after = Some(1);
        let mut delay = MockDelay::default();

        assert!(run_command_list(&mut bus, &mut delay, INIT_SEQUENCE).is_err());
        assert_eq!(bus.frames.len(), 1);
        assert!(delay.ms.len() <= 1);
    }

    #[test]
    fn init_sequence_is_well_formed() {
        let mut bus = MockPanel::new(16, 16);
        let mut delay = MockDelay::default();

        let sent = run_command_list(&mut bus, &mut delay, INIT_SEQUENCE).unwrap();

        assert_eq!(sent, 22);
        assert_eq!(bus.frames.first(), Some(&Frame::Command(SWRESET)));
        assert_eq!(delay.ms, vec![150, 500]);
    }
}
