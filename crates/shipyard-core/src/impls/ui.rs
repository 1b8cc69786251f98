use std::sync::{Mutex, PoisonError};

use crate::ports::Ui;

/// 各行を標準出力に書く
#[derive(Debug, Default)]
pub struct ConsoleUi;

impl Ui for ConsoleUi {
    fn output(&self, msg: &str) {
        println!("{msg}");
    }
}

/// 出力行を溜める（テスト・組み込み用）
#[derive(Debug, Default)]
pub struct BufferUi {
    lines: Mutex<Vec<String>>,
}

impl BufferUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Ui for BufferUi {
    fn output(&self, msg: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(msg.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_keeps_order() {
        let ui = BufferUi::new();
        ui.output("one");
        ui.output("two");
        assert_eq!(ui.lines(), vec!["one", "two"]);
    }
}
