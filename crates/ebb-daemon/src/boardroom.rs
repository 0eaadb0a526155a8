// crates/ebb-daemon/src/boardroom.rs
//
// Daemon-side collaborators for the treasury: a boardroom that logs
// the grants it receives and a chronicle recording per-epoch figures.

use serde::Serialize;

use ebb_core::error::EbbError;
use ebb_core::token::{Amount, Wad};
use ebb_core::traits::{Boardroom, EpochStats};

/// Boardroom stand-in that tallies seigniorage grants.
#[derive(Debug, Default)]
pub struct LoggingBoardroom {
    total_granted: Amount,
}

impl LoggingBoardroom {
    pub fn total_granted(&self) -> Amount {
        self.total_granted
    }
}

impl Boardroom for LoggingBoardroom {
    fn allocate_seigniorage(&mut self, amount: Amount) -> Result<(), EbbError> {
        self.total_granted = self.total_granted.saturating_add(amount);
        tracing::info!(amount = %Wad(amount), "boardroom received seigniorage");
        Ok(())
    }
}

/// One epoch's recorded allocation figures.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EpochRecord {
    pub epoch: u64,
    pub twap: Amount,
    pub expanded: Amount,
    pub boardroom: Amount,
    pub dao: Amount,
    pub marketing: Amount,
    pub insurance: Amount,
    pub bonded: Amount,
    pub redeemed: Amount,
}

/// In-memory epoch statistics, dumped as JSON on shutdown.
#[derive(Debug, Default)]
pub struct EpochChronicle {
    records: Vec<EpochRecord>,
}

impl EpochChronicle {
    pub fn records(&self) -> &[EpochRecord] {
        &self.records
    }

    fn record_mut(&mut self, epoch: u64) -> &mut EpochRecord {
        let idx = match self.records.iter().position(|r| r.epoch == epoch) {
            Some(idx) => idx,
            None => {
                self.records.push(EpochRecord {
                    epoch,
                    ..EpochRecord::default()
                });
                self.records.len() - 1
            }
        };
        &mut self.records[idx]
    }
}

impl EpochStats for EpochChronicle {
    fn add_epoch_info(
        &mut self,
        epoch: u64,
        twap: Amount,
        expanded: Amount,
        boardroom: Amount,
        dao: Amount,
        marketing: Amount,
        insurance: Amount,
    ) {
        let record = self.record_mut(epoch);
        record.twap = twap;
        record.expanded = record.expanded.saturating_add(expanded);
        record.boardroom = record.boardroom.saturating_add(boardroom);
        record.dao = record.dao.saturating_add(dao);
        record.marketing = record.marketing.saturating_add(marketing);
        record.insurance = record.insurance.saturating_add(insurance);
    }

    fn add_bonded(&mut self, epoch: u64, amount: Amount) {
        let record = self.record_mut(epoch);
        record.bonded = record.bonded.saturating_add(amount);
    }

    fn add_redeemed(&mut self, epoch: u64, amount: Amount) {
        let record = self.record_mut(epoch);
        record.redeemed = record.redeemed.saturating_add(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ebb_core::token::WAD;

    #[test]
    fn test_chronicle_accumulates_per_epoch() {
        let mut chronicle = EpochChronicle::default();
        chronicle.add_epoch_info(1, WAD, 10 * WAD, 7 * WAD, 2 * WAD, WAD, 0);
        chronicle.add_bonded(1, 3 * WAD);
        chronicle.add_bonded(1, 2 * WAD);
        chronicle.add_redeemed(2, WAD);
        assert_eq!(chronicle.records().len(), 2);
        let first = &chronicle.records()[0];
        assert_eq!(first.bonded, 5 * WAD);
        assert_eq!(first.boardroom, 7 * WAD);
        assert_eq!(chronicle.records()[1].redeemed, WAD);
    }
}
