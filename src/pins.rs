//! GPIO / peripheral pin assignments for the testbed nodes.
//!
//! Single source of truth — the node binaries reference this module
//! rather than hard-coding pin numbers. Change a pin here and it
//! propagates everywhere.

// ---------------------------------------------------------------------------
// Reader node — MFRC522 contactless reader on VSPI
// ---------------------------------------------------------------------------

/// SPI chip-select (SDA/SS on the RC522 breakout).
pub const RC522_CS_GPIO: i32 = 5;
/// RC522 hardware reset line.
pub const RC522_RST_GPIO: i32 = 22;

/// VSPI clock.
pub const SPI_SCK_GPIO: i32 = 18;
/// VSPI MISO (RC522 → MCU).
pub const SPI_MISO_GPIO: i32 = 19;
/// VSPI MOSI (MCU → RC522).
pub const SPI_MOSI_GPIO: i32 = 23;

/// RC522 SPI clock rate (Hz). The chip tops out at 10 MHz; 1 MHz leaves
/// margin for breadboard wiring.
pub const RC522_SPI_BAUD_HZ: u32 = 1_000_000;

// ---------------------------------------------------------------------------
// Relay node — door-strike relay module
// ---------------------------------------------------------------------------

/// Digital output driving the relay module's IN pin.
/// The module is **active LOW**: logic LOW energises the coil.
pub const RELAY_GPIO: i32 = 26;
