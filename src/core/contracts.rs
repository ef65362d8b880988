use crate::utils::error::{GuardError, Result};
use serde_json::{json, Value};
use std::path::Path;
use std::process::Command;

/// 前置條件不成立時回傳 `ContractViolation`
macro_rules! ensure {
    ($cond:expr, $($msg:tt)+) => {
        if !$cond {
            return Err(GuardError::contract(format!($($msg)+)));
        }
    };
}

pub fn square_root(number: f64) -> Result<f64> {
    ensure!(number > 0.0, "Number must be positive");
    Ok(number.sqrt())
}

pub fn first_element<T>(elements: &[T]) -> Result<&T> {
    elements
        .first()
        .ok_or_else(|| GuardError::contract("List cannot be empty"))
}

#[derive(Debug, Clone, PartialEq)]
pub struct BankAccount {
    balance: f64,
}

impl BankAccount {
    pub fn new(balance: f64) -> Result<Self> {
        ensure!(balance >= 0.0, "Initial balance cannot be negative");
        Ok(Self { balance })
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn deposit(&mut self, amount: f64) -> Result<()> {
        ensure!(amount > 0.0, "Deposit amount must be positive");
        self.balance += amount;
        Ok(())
    }

    pub fn withdraw(&mut self, amount: f64) -> Result<()> {
        ensure!(amount > 0.0, "Withdrawal amount must be positive");
        ensure!(amount <= self.balance, "Insufficient funds");
        self.balance -= amount;
        Ok(())
    }
}

/// 輸入必須已排序且非空；偶數長度取中間兩數的平均
pub fn median(sorted_numbers: &[f64]) -> Result<f64> {
    ensure!(!sorted_numbers.is_empty(), "Input list must not be empty");
    ensure!(
        sorted_numbers.windows(2).all(|w| w[0] <= w[1]),
        "List must be sorted"
    );

    let n = sorted_numbers.len();
    let mid = n / 2;
    if n % 2 == 0 {
        Ok((sorted_numbers[mid - 1] + sorted_numbers[mid]) / 2.0)
    } else {
        Ok(sorted_numbers[mid])
    }
}

pub fn process_record(data: &Value) -> Result<Value> {
    let obj = data
        .as_object()
        .ok_or_else(|| GuardError::contract("Input must be an object"))?;
    ensure!(
        obj.contains_key("name") && obj.contains_key("age"),
        "Object must contain 'name' and 'age'"
    );

    let name = obj["name"]
        .as_str()
        .ok_or_else(|| GuardError::contract("'name' must be a string"))?;
    let age = obj["age"]
        .as_i64()
        .ok_or_else(|| GuardError::contract("'age' must be an integer"))?;
    let processed_age = age
        .checked_add(10)
        .ok_or_else(|| GuardError::contract("'age' is out of range"))?;

    let processed = json!({
        "processed_name": name.to_uppercase(),
        "processed_age": processed_age,
    });

    ensure!(
        processed.get("processed_name").is_some() && processed.get("processed_age").is_some(),
        "Processing failed to meet requirements"
    );
    Ok(processed)
}

pub fn ensure_file_exists<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    ensure!(path.exists(), "File {} does not exist", path.display());
    Ok(())
}

/// 實際以讀寫模式開啟來確認權限，而不是只看權限位元
pub fn ensure_read_write<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    ensure_file_exists(path)?;

    std::fs::OpenOptions::new()
        .read(true)
        .append(true)
        .open(path)
        .map(|_| ())
        .map_err(|e| {
            GuardError::contract(format!("File {} cannot be read/written: {}", path.display(), e))
        })
}

/// 不經過 shell 執行指令，非零結束碼視為失敗
pub fn run_checked(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program).args(args).output()?;

    if !output.status.success() {
        return Err(GuardError::CommandFailed {
            command: std::iter::once(program)
                .chain(args.iter().copied())
                .collect::<Vec<_>>()
                .join(" "),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
