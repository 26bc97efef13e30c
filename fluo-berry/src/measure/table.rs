use std::fmt;
use std::io::{self, Write};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 结果表中的一个单元格.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Cell {
    /// 文本.
    Text(String),
    /// 浮点数.
    Number(f64),
    /// 整数.
    Integer(i64),
    /// 无定义的值 (例如参考体积为零时的比例). 显示为 `/`.
    Undefined,
}

impl Cell {
    /// 浮点值; 文本与无定义单元格返回 `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Number(v) => Some(v),
            Self::Integer(v) => Some(v as f64),
            _ => None,
        }
    }

    /// 文本值; 其他类型返回 `None`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(v) => write!(f, "{v:.6}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Undefined => f.write_str("/"),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<usize> for Cell {
    fn from(v: usize) -> Self {
        Self::Integer(v as i64)
    }
}

/// 结果表中的一行: 有序的 `(列名, 单元格)` 序列.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeasurementRow {
    cells: Vec<(String, Cell)>,
}

impl MeasurementRow {
    /// 空行.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个单元格, 返回自身以便链式调用.
    #[inline]
    pub fn with(mut self, column: impl Into<String>, cell: impl Into<Cell>) -> Self {
        self.push(column, cell);
        self
    }

    /// 追加一个单元格. 同名列会覆盖先前的值.
    pub fn push(&mut self, column: impl Into<String>, cell: impl Into<Cell>) {
        let column = column.into();
        let cell = cell.into();
        match self.cells.iter_mut().find(|(c, _)| *c == column) {
            Some((_, old)) => *old = cell,
            None => self.cells.push((column, cell)),
        }
    }

    /// 获取某列的值.
    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells
            .iter()
            .find_map(|(c, v)| (c == column).then_some(v))
    }

    /// 按插入顺序迭代所有 `(列名, 单元格)`.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.cells.iter().map(|(c, v)| (c.as_str(), v))
    }
}

/// 只追加的结果表. 列按首次出现的顺序排列, 行按追加顺序排列.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResultsTable {
    columns: Vec<String>,
    rows: Vec<MeasurementRow>,
}

impl ResultsTable {
    /// 空表.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一行. 新出现的列追加到表头末尾.
    pub fn push_row(&mut self, row: MeasurementRow) {
        for (column, _) in row.iter() {
            if !self.columns.iter().any(|c| c == column) {
                self.columns.push(column.to_string());
            }
        }
        self.rows.push(row);
    }

    /// 表头.
    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// 所有行.
    #[inline]
    pub fn rows(&self) -> &[MeasurementRow] {
        &self.rows
    }

    /// 行数.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 是否没有任何行?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 获取第 `row` 行 `column` 列的值.
    #[inline]
    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// 以制表符分隔的文本形式写出, 首行为表头. 某行缺失的列留空.
    pub fn write_tsv<W: Write>(&self, mut w: W) -> io::Result<()> {
        writeln!(w, "{}", self.columns.join("\t"))?;
        for row in self.rows.iter() {
            let line: Vec<String> = self
                .columns
                .iter()
                .map(|c| row.get(c).map(ToString::to_string).unwrap_or_default())
                .collect();
            writeln!(w, "{}", line.join("\t"))?;
        }
        Ok(())
    }
}
