//! Combinational gate cells over three-valued signals.

use crate::cell::{Cell, CellContext, CellOutput};
use crate::gate::SignalMap;
use crate::signal::Signal;

/// Unary gate operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    /// Bitwise negation.
    Not,
    /// Identity buffer.
    Repeat,
}

/// A one-input gate reading `in` and driving `out`.
#[derive(Clone, Copy, Debug)]
pub struct UnaryGate {
    op: UnaryOp,
}

impl UnaryGate {
    /// Creates a unary gate cell.
    pub fn new(op: UnaryOp) -> Self {
        Self { op }
    }
}

impl Cell for UnaryGate {
    fn operation(&self, ctx: CellContext<'_>) -> CellOutput {
        let mut outputs = SignalMap::new();
        if let Some(sig) = ctx.inputs.get("in") {
            let result = match self.op {
                UnaryOp::Not => !sig,
                UnaryOp::Repeat => sig.clone(),
            };
            outputs.insert("out".to_string(), result);
        }
        CellOutput::new(outputs)
    }
}

/// Binary gate operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    And,
    Or,
    Xor,
    Nand,
    Nor,
}

/// A two-input gate reading `in1`/`in2` and driving `out`.
#[derive(Clone, Copy, Debug)]
pub struct BinaryGate {
    op: BinaryOp,
}

impl BinaryGate {
    /// Creates a binary gate cell.
    pub fn new(op: BinaryOp) -> Self {
        Self { op }
    }

    fn apply(&self, a: &Signal, b: &Signal) -> Signal {
        match self.op {
            BinaryOp::And => a & b,
            BinaryOp::Or => a | b,
            BinaryOp::Xor => a ^ b,
            BinaryOp::Nand => !&(a & b),
            BinaryOp::Nor => !&(a | b),
        }
    }
}

impl Cell for BinaryGate {
    fn operation(&self, ctx: CellContext<'_>) -> CellOutput {
        let mut outputs = SignalMap::new();
        if let (Some(a), Some(b)) = (ctx.inputs.get("in1"), ctx.inputs.get("in2")) {
            outputs.insert("out".to_string(), self.apply(a, b));
        }
        CellOutput::new(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_unary(op: UnaryOp, input: &str) -> String {
        let cell = UnaryGate::new(op);
        let mut inputs = SignalMap::new();
        inputs.insert("in".to_string(), Signal::from_binary_str(input).unwrap());
        let mut params = serde_json::json!({});
        let out = cell.operation(CellContext {
            inputs: &inputs,
            params: &mut params,
        });
        format!("{}", out.outputs["out"])
    }

    fn eval_binary(op: BinaryOp, a: &str, b: &str) -> String {
        let cell = BinaryGate::new(op);
        let mut inputs = SignalMap::new();
        inputs.insert("in1".to_string(), Signal::from_binary_str(a).unwrap());
        inputs.insert("in2".to_string(), Signal::from_binary_str(b).unwrap());
        let mut params = serde_json::json!({});
        let out = cell.operation(CellContext {
            inputs: &inputs,
            params: &mut params,
        });
        format!("{}", out.outputs["out"])
    }

    #[test]
    fn not_gate() {
        assert_eq!(eval_unary(UnaryOp::Not, "10X"), "01X");
    }

    #[test]
    fn repeater() {
        assert_eq!(eval_unary(UnaryOp::Repeat, "1X0"), "1X0");
    }

    #[test]
    fn and_gate() {
        assert_eq!(eval_binary(BinaryOp::And, "1100", "1010"), "1000");
        // X with a dominating zero resolves
        assert_eq!(eval_binary(BinaryOp::And, "XX", "10"), "X0");
    }

    #[test]
    fn or_gate() {
        assert_eq!(eval_binary(BinaryOp::Or, "1100", "1010"), "1110");
        assert_eq!(eval_binary(BinaryOp::Or, "XX", "10"), "1X");
    }

    #[test]
    fn xor_gate() {
        assert_eq!(eval_binary(BinaryOp::Xor, "1100", "1010"), "0110");
        assert_eq!(eval_binary(BinaryOp::Xor, "X1", "11"), "X0");
    }

    #[test]
    fn nand_nor() {
        assert_eq!(eval_binary(BinaryOp::Nand, "11", "10"), "01");
        assert_eq!(eval_binary(BinaryOp::Nor, "10", "00"), "01");
    }
}
