//! 表格工件（Frame）：行 × 具名列，供工具读写与 Synthesizer 渲染
//!
//! 没有全局 schema——每个工具自己负责写出的形状；dtype 按列内容推断。

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::core::AgentError;

/// 单元格值。untagged：JSON 中就是裸的 null / 数字 / 字符串
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    Str(String),
}

impl Cell {
    pub fn dtype(&self) -> Dtype {
        match self {
            Cell::Null => Dtype::Null,
            Cell::Int(_) => Dtype::Int,
            Cell::Float(_) => Dtype::Float,
            Cell::Date(_) => Dtype::Date,
            Cell::Str(_) => Dtype::Str,
        }
    }

    /// 数值视图：Int/Float 转 f64，其余 None
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// 排序用比较：数值按大小，日期按时间序，字符串按字典序，Null 最小
    pub fn compare(&self, other: &Cell) -> Ordering {
        match (self, other) {
            (Cell::Null, Cell::Null) => Ordering::Equal,
            (Cell::Null, _) => Ordering::Less,
            (_, Cell::Null) => Ordering::Greater,
            (Cell::Date(a), Cell::Date(b)) => a.cmp(b),
            (Cell::Str(a), Cell::Str(b)) => a.cmp(b),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => self.render().cmp(&other.render()),
            },
        }
    }

    fn render(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Int(v) => v.to_string(),
            Cell::Float(v) => format!("{:.2}", v),
            Cell::Date(d) => d.to_string(),
            Cell::Str(s) => s.clone(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// 列类型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dtype {
    Null,
    Int,
    Float,
    Date,
    Str,
}

/// 单列签名
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub dtype: Dtype,
}

/// Frame 的 schema：列名 + 推断 dtype，不含数据本身（纠偏上下文只带这个）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSchema {
    pub columns: Vec<ColumnSchema>,
}

impl FrameSchema {
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

impl fmt::Display for FrameSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cols: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{} ({:?})", c.name, c.dtype))
            .collect();
        write!(f, "[{}]", cols.join(", "))
    }
}

/// 表格工件：有序行 + 具名列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Frame {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), AgentError> {
        if row.len() != self.columns.len() {
            return Err(AgentError::ToolExecutionFailed(format!(
                "Row has {} cells but frame has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    fn require_column(&self, name: &str) -> Result<usize, AgentError> {
        self.column_index(name).ok_or_else(|| {
            AgentError::ToolExecutionFailed(format!(
                "Column '{}' not found; available columns: [{}]",
                name,
                self.columns.join(", ")
            ))
        })
    }

    /// 推断 schema：每列取首个非 Null 单元的 dtype；Int 与 Float 混合提升为 Float
    pub fn schema(&self) -> FrameSchema {
        let columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let mut dtype = Dtype::Null;
                for row in &self.rows {
                    match (dtype, row[i].dtype()) {
                        (_, Dtype::Null) => {}
                        (Dtype::Null, d) => dtype = d,
                        (Dtype::Int, Dtype::Float) | (Dtype::Float, Dtype::Int) => {
                            dtype = Dtype::Float;
                            break;
                        }
                        (a, b) if a == b => {}
                        _ => {
                            dtype = Dtype::Str;
                            break;
                        }
                    }
                }
                ColumnSchema {
                    name: name.clone(),
                    dtype,
                }
            })
            .collect();
        FrameSchema { columns }
    }

    /// 内连接：按 on 列匹配，右表重名列（除 on 外）加后缀区分
    pub fn merge(&self, right: &Frame, on: &str, suffixes: (&str, &str)) -> Result<Frame, AgentError> {
        let left_key = self.require_column(on)?;
        let right_key = right.require_column(on)?;

        let mut columns: Vec<String> = Vec::new();
        for c in &self.columns {
            if c != on && right.column_index(c).is_some() {
                columns.push(format!("{}{}", c, suffixes.0));
            } else {
                columns.push(c.clone());
            }
        }
        for c in &right.columns {
            if c == on {
                continue;
            }
            if self.column_index(c).is_some() {
                columns.push(format!("{}{}", c, suffixes.1));
            } else {
                columns.push(c.clone());
            }
        }

        let mut out = Frame::new(columns);
        for lrow in &self.rows {
            for rrow in &right.rows {
                if lrow[left_key] == rrow[right_key] {
                    let mut row: Vec<Cell> = lrow.clone();
                    for (i, cell) in rrow.iter().enumerate() {
                        if i != right_key {
                            row.push(cell.clone());
                        }
                    }
                    out.push_row(row)?;
                }
            }
        }
        Ok(out)
    }

    /// 新增一列：对两个已有数值列做算术运算
    pub fn with_column(
        &self,
        name: &str,
        left: &str,
        op: ArithOp,
        right: &str,
    ) -> Result<Frame, AgentError> {
        let li = self.require_column(left)?;
        let ri = self.require_column(right)?;
        let mut out = self.clone();
        out.columns.push(name.to_string());
        for row in &mut out.rows {
            let (a, b) = (row[li].as_f64(), row[ri].as_f64());
            let cell = match (a, b) {
                (Some(a), Some(b)) => match op.apply(a, b) {
                    Some(v) => Cell::Float(v),
                    None => Cell::Null,
                },
                _ => {
                    return Err(AgentError::ToolExecutionFailed(format!(
                        "Columns '{}' and '{}' must be numeric for '{}'",
                        left, right, name
                    )))
                }
            };
            row.push(cell);
        }
        Ok(out)
    }

    /// 按列排序（稳定排序，保持同值行的原始顺序）
    pub fn sort_by(&self, column: &str, descending: bool) -> Result<Frame, AgentError> {
        let idx = self.require_column(column)?;
        let mut out = self.clone();
        out.rows.sort_by(|a, b| {
            let ord = a[idx].compare(&b[idx]);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        });
        Ok(out)
    }

    /// 前 n 行
    pub fn head(&self, n: usize) -> Frame {
        let mut out = self.clone();
        out.rows.truncate(n);
        out
    }

    /// 列投影，按给定顺序
    pub fn select(&self, columns: &[String]) -> Result<Frame, AgentError> {
        let indices: Vec<usize> = columns
            .iter()
            .map(|c| self.require_column(c))
            .collect::<Result<_, _>>()?;
        let mut out = Frame::new(columns.to_vec());
        for row in &self.rows {
            out.push_row(indices.iter().map(|&i| row[i].clone()).collect())?;
        }
        Ok(out)
    }

    /// 纯文本渲染（Synthesizer prompt 用），行数超出上限时截断
    pub fn to_display_string(&self, max_rows: usize) -> String {
        let mut s = self.columns.join(" | ");
        s.push('\n');
        for row in self.rows.iter().take(max_rows) {
            let cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
            s.push_str(&cells.join(" | "));
            s.push('\n');
        }
        if self.rows.len() > max_rows {
            s.push_str(&format!("... ({} more rows)\n", self.rows.len() - max_rows));
        }
        s
    }
}

/// with_column 支持的二元算术
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    fn apply(&self, a: f64, b: f64) -> Option<f64> {
        match self {
            ArithOp::Add => Some(a + b),
            ArithOp::Sub => Some(a - b),
            ArithOp::Mul => Some(a * b),
            ArithOp::Div => {
                if b == 0.0 {
                    None
                } else {
                    Some(a / b)
                }
            }
        }
    }
}
