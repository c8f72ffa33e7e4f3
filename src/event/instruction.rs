use super::AddressSpace;

/// Tagged classification of an instruction's opcode.
///
/// The worker accumulator dispatches on this tag rather than comparing
/// mnemonic strings: address-space classification and conditional-branch
/// detection are data-driven decisions the host descriptor already knows
/// how to make, and a tagged match keeps the hot loop free of string
/// comparisons. [`InstructionInfo::mnemonic`] is still consulted separately
/// to key the `computeOps` histogram, since that map is keyed by opcode
/// name for arbitrary opcodes, not just the three classified here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    Load,
    Store,
    /// Unconditional or conditional branch. Whether a particular `Br` is
    /// conditional is determined by [`InstructionInfo::is_conditional_branch`],
    /// since an unconditional branch also carries this tag but has only one
    /// label operand.
    Br,
    Other,
}

/// Everything the worker accumulator needs to know about one retired IR
/// instruction.
///
/// Implemented by the host interpreter's instruction handle; the core
/// never constructs one.
pub trait InstructionInfo {
    /// Tagged opcode classification for dispatch.
    fn opcode(&self) -> Opcode;

    /// Opcode mnemonic, used as the `computeOps` histogram key.
    fn mnemonic(&self) -> &str;

    /// Number of operands.
    fn operand_count(&self) -> usize;

    /// Whether the operand at `index` is a label (basic-block reference).
    ///
    /// Panics if `index >= operand_count()`, matching the host's own
    /// bounds-checked accessor.
    fn operand_is_label(&self, index: usize) -> bool;

    /// Textual representation of the operand at `index`, used to identify
    /// which basic block a branch target or a post-branch instruction's
    /// parent block refers to.
    fn operand_text(&self, index: usize) -> &str;

    /// Textual label of the pointer operand, for [`Opcode::Load`] and
    /// [`Opcode::Store`] only.
    fn pointer_operand_label(&self) -> &str;

    /// Textual label of the basic block this instruction belongs to. Used
    /// to decide, for the instruction immediately following a conditional
    /// branch, which of the branch's two recorded targets it landed in.
    fn parent_block_label(&self) -> &str;

    /// Address space of the pointer operand, for [`Opcode::Load`] and
    /// [`Opcode::Store`] only.
    fn pointer_address_space(&self) -> AddressSpace;

    /// Source line number from debug info, if any.
    fn debug_line(&self) -> u32;

    /// Number of scalar elements in the instruction's result (SIMD width).
    fn result_width(&self) -> u32;

    /// Whether this instruction is a conditional branch: a [`Opcode::Br`]
    /// with exactly three operands where operands 1 and 2 are labels
    /// (operand 0 is the condition).
    fn is_conditional_branch(&self) -> bool {
        self.opcode() == Opcode::Br
            && self.operand_count() == 3
            && self.operand_is_label(1)
            && self.operand_is_label(2)
    }
}
