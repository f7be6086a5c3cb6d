//! MFRC522 contactless-reader adapter.
//!
//! Implements [`CardReader`] over the `mfrc522` driver. The presence
//! probe is a bare REQA; the AtqA it returns is held until the matching
//! `read_uid()` runs the anticollision/select sequence. `release()`
//! halts the card and drops any crypto session, without which the chip
//! never reports the next card.

use crate::app::ports::CardReader;
use crate::uid::CardUid;

// ───────────────────────────────────────────────────────────────
// ESP-IDF implementation
// ───────────────────────────────────────────────────────────────

#[cfg(feature = "espidf")]
pub struct Rc522Adapter<SPI> {
    mfrc522: mfrc522::Mfrc522<mfrc522::comm::blocking::spi::SpiInterface<SPI>, mfrc522::Initialized>,
    atqa: Option<mfrc522::AtqA>,
}

#[cfg(feature = "espidf")]
impl<SPI: embedded_hal::spi::SpiDevice> Rc522Adapter<SPI> {
    pub fn new(spi: SPI) -> crate::error::Result<Self> {
        let comm = mfrc522::comm::blocking::spi::SpiInterface::new(spi);
        let mfrc522 = mfrc522::Mfrc522::new(comm)
            .init()
            .map_err(|_| crate::error::Error::Init("RC522 init failed"))?;
        Ok(Self {
            mfrc522,
            atqa: None,
        })
    }
}

#[cfg(feature = "espidf")]
impl<SPI: embedded_hal::spi::SpiDevice> CardReader for Rc522Adapter<SPI> {
    fn card_present(&mut self) -> bool {
        match self.mfrc522.reqa() {
            Ok(atqa) => {
                self.atqa = Some(atqa);
                true
            }
            Err(_) => {
                self.atqa = None;
                false
            }
        }
    }

    fn read_uid(&mut self) -> Option<CardUid> {
        let atqa = self.atqa.take()?;
        let uid = self.mfrc522.select(&atqa).ok()?;
        CardUid::from_bytes(uid.as_bytes())
    }

    fn release(&mut self) {
        let _ = self.mfrc522.hlta();
        let _ = self.mfrc522.stop_crypto1();
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

/// Scripted reader simulation: presented cards queue up and enter the
/// field one at a time; `release()` removes the current card.
#[cfg(not(feature = "espidf"))]
pub struct Rc522Adapter {
    queue: std::collections::VecDeque<CardUid>,
    current: Option<CardUid>,
    select_fails: bool,
    /// Number of `release()` calls observed.
    pub releases: u32,
}

#[cfg(not(feature = "espidf"))]
impl Rc522Adapter {
    pub fn new() -> Self {
        Self {
            queue: std::collections::VecDeque::new(),
            current: None,
            select_fails: false,
            releases: 0,
        }
    }

    /// Present a card to the field (queued behind any current card).
    pub fn sim_present(&mut self, bytes: &[u8]) {
        let uid = CardUid::from_bytes(bytes).expect("sim UID invalid");
        self.queue.push_back(uid);
    }

    /// Make every selection attempt fail (card held at field edge).
    pub fn sim_fail_select(&mut self, fail: bool) {
        self.select_fails = fail;
    }

    /// Whether a card is currently in the field.
    pub fn sim_card_in_field(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(not(feature = "espidf"))]
impl CardReader for Rc522Adapter {
    fn card_present(&mut self) -> bool {
        if self.current.is_none() {
            self.current = self.queue.pop_front();
        }
        self.current.is_some()
    }

    fn read_uid(&mut self) -> Option<CardUid> {
        if self.select_fails {
            return None;
        }
        self.current.clone()
    }

    fn release(&mut self) {
        self.releases += 1;
        self.current = None;
    }
}
