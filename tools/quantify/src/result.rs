//! 运行结果.

use fluo_berry::measure::ResultsTable;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// 一次运行的最终结果.
pub struct Report {
    title: String,
    table: ResultsTable,
}

impl Report {
    pub fn new(title: &str, table: ResultsTable) -> Self {
        Self {
            title: title.to_string(),
            table,
        }
    }

    /// 把结果表写进 `w` 中.
    fn describe_into<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "Results of `{}` ({} row(s)):", self.title, self.table.len())?;
        self.table.write_tsv(w)
    }

    /// 打印运行结果.
    pub fn analyze(&self) {
        sep();
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        if let Err(e) = self.describe_into(&mut lock) {
            log::error!("failed to print results: {e}");
        }
        sep();
    }

    /// 以 TSV 格式保存结果表.
    pub fn save_tsv(&self, path: &Path) -> io::Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        self.table.write_tsv(&mut w)?;
        w.flush()
    }
}

#[inline]
fn sep() {
    println!("{}", "-".repeat(48));
}
