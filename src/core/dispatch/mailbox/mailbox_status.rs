use std::sync::atomic::{AtomicU32, Ordering};

use num_enum::TryFromPrimitive;

/// Primary lifecycle state held in the low two bits of the status word.
///
/// The numeric values are load-bearing: `word <= Suspended` holds exactly when
/// the primary state is `Open` or `Suspended` and the scheduled bit is clear,
/// which lets `set_as_scheduled` gate on a single comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum MailboxStatus {
  Open = 0,
  Suspended = 1,
  Closed = 2,
}

const PRIMARY_MASK: u32 = 3;
const SCHEDULED: u32 = 4;

/// Packed atomic mailbox state: primary lifecycle bits plus the scheduled flag.
///
/// All transitions are CAS retry loops; reads are acquire and the CAS is
/// acq-rel, so a thread that observes a status value also observes everything
/// published before the transition that stored it.
#[derive(Debug)]
pub struct StatusWord {
  current_status: AtomicU32,
}

impl StatusWord {
  pub fn new() -> Self {
    Self {
      current_status: AtomicU32::new(MailboxStatus::Open as u32),
    }
  }

  pub fn status(&self) -> u32 {
    self.current_status.load(Ordering::Acquire)
  }

  pub fn primary(&self) -> MailboxStatus {
    MailboxStatus::try_from(self.status() & PRIMARY_MASK).unwrap()
  }

  pub fn should_process_message(&self) -> bool {
    self.status() & PRIMARY_MASK == MailboxStatus::Open as u32
  }

  pub fn is_suspended(&self) -> bool {
    self.status() & PRIMARY_MASK == MailboxStatus::Suspended as u32
  }

  pub fn is_closed(&self) -> bool {
    self.status() & PRIMARY_MASK == MailboxStatus::Closed as u32
  }

  pub fn is_scheduled(&self) -> bool {
    self.status() & SCHEDULED != 0
  }

  pub fn become_open(&self) -> bool {
    self.transition_primary(MailboxStatus::Open)
  }

  pub fn become_suspended(&self) -> bool {
    self.transition_primary(MailboxStatus::Suspended)
  }

  /// Closes the mailbox. `Closed` is terminal; repeated calls return false.
  pub fn become_closed(&self) -> bool {
    self.transition_primary(MailboxStatus::Closed)
  }

  /// Sets the scheduled flag when the mailbox is open or suspended and not
  /// already scheduled. The `<= Suspended` comparison covers all three
  /// conditions at once.
  pub fn set_as_scheduled(&self) -> bool {
    loop {
      let s = self.status();
      if s > MailboxStatus::Suspended as u32 {
        log::debug!("set_as_scheduled: rejected, status = {}", s);
        return false;
      }
      if self.update_status(s, s | SCHEDULED) {
        return true;
      }
    }
  }

  /// Clears the scheduled flag, whatever the primary state.
  pub fn set_as_idle(&self) {
    loop {
      let s = self.status();
      if self.update_status(s, s & !SCHEDULED) {
        return;
      }
    }
  }

  fn transition_primary(&self, next: MailboxStatus) -> bool {
    loop {
      let s = self.status();
      if s & PRIMARY_MASK == MailboxStatus::Closed as u32 {
        log::debug!("transition to {:?} ignored, mailbox is closed", next);
        return false;
      }
      if self.update_status(s, (s & SCHEDULED) | next as u32) {
        return true;
      }
    }
  }

  fn update_status(&self, old: u32, new: u32) -> bool {
    self
      .current_status
      .compare_exchange(old, new, Ordering::AcqRel, Ordering::Acquire)
      .is_ok()
  }
}

impl Default for StatusWord {
  fn default() -> Self {
    Self::new()
  }
}
