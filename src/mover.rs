//! Move strategies: how a finished temp file replaces the backing file.
//!
//! The default, [`RenameMove`], uses `rename` for the atomic path and a
//! copy-over for the fallback. Swap in your own implementation through
//! [`EntityStoreBuilder::move_strategy`](crate::EntityStoreBuilder::move_strategy).
//! Any `Fn(&Path, &Path, bool) -> Result<()>` closure qualifies, which keeps
//! one-off fault injection short.

use crate::error::Result;
use std::path::Path;

/// Relocates a completed temp file onto its destination.
pub trait MoveStrategy: Send + Sync {
    /// Move `from` onto `to`, replacing `to` if it exists.
    ///
    /// With `atomic = true` the replacement must be indivisible; return
    /// [`Error::AtomicMoveUnsupported`](crate::Error::AtomicMoveUnsupported)
    /// if that can't be done here. With `atomic = false` a plain overwrite is
    /// acceptable.
    fn move_file(&self, from: &Path, to: &Path, atomic: bool) -> Result<()>;
}

/// Rename when atomic, copy-and-replace otherwise.
///
/// Rename is only atomic within one filesystem, which is why the writer
/// stages its temp file next to the destination.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenameMove;

impl MoveStrategy for RenameMove {
    fn move_file(&self, from: &Path, to: &Path, atomic: bool) -> Result<()> {
        if atomic {
            std::fs::rename(from, to)?;
        } else {
            std::fs::copy(from, to)?;
            // the writer removes leftovers anyway
            let _ = std::fs::remove_file(from);
        }
        Ok(())
    }
}

impl<F> MoveStrategy for F
where
    F: Fn(&Path, &Path, bool) -> Result<()> + Send + Sync,
{
    fn move_file(&self, from: &Path, to: &Path, atomic: bool) -> Result<()> {
        self(from, to, atomic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_modes_replace_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("dest.json");
        std::fs::write(&dest, "old").unwrap();

        for atomic in [true, false] {
            let src = dir.path().join("src.tmp");
            std::fs::write(&src, format!("new-{atomic}")).unwrap();
            RenameMove.move_file(&src, &dest, atomic).unwrap();
            assert_eq!(std::fs::read_to_string(&dest).unwrap(), format!("new-{atomic}"));
            assert!(!src.exists());
        }
    }

    #[test]
    fn missing_source_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RenameMove
            .move_file(&dir.path().join("nope"), &dir.path().join("dest"), true)
            .unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }

    #[test]
    fn closure_refusing_atomic_moves() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.tmp");
        let dest = dir.path().join("dest.json");
        std::fs::write(&src, "[]").unwrap();

        let copy_only = |from: &Path, to: &Path, atomic: bool| -> Result<()> {
            if atomic {
                return Err(crate::Error::AtomicMoveUnsupported);
            }
            RenameMove.move_file(from, to, false)
        };
        let strategy: &dyn MoveStrategy = &copy_only;

        assert_eq!(
            strategy.move_file(&src, &dest, true),
            Err(crate::Error::AtomicMoveUnsupported)
        );
        assert!(src.exists());
        strategy.move_file(&src, &dest, false).unwrap();
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "[]");
    }
}
