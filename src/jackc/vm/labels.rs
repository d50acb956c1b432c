/// Run-wide label counters, one per statement kind.
///
/// A single counter is created when a run starts and lent to every unit's
/// [`VmWriter`](super::VmWriter), so labels stay unique across all output
/// produced by that run. It is never reset.
#[derive(Debug, Default)]
pub struct LabelCounter {
    while_count: usize,
    if_count: usize,
}

impl LabelCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_while(&mut self) -> WhileLabels {
        let labels = WhileLabels(self.while_count);
        self.while_count += 1;
        labels
    }

    pub fn next_if(&mut self) -> IfLabels {
        let labels = IfLabels(self.if_count);
        self.if_count += 1;
        labels
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WhileLabels(pub usize);

impl WhileLabels {
    pub fn begin(&self) -> String {
        format!("BEGIN_WHILE_{}", self.0)
    }

    pub fn end(&self) -> String {
        format!("END_WHILE_{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IfLabels(pub usize);

impl IfLabels {
    pub fn if_true(&self) -> String {
        format!("IF_TRUE_{}", self.0)
    }

    pub fn if_false(&self) -> String {
        format!("IF_FALSE_{}", self.0)
    }

    pub fn end(&self) -> String {
        format!("END_IF_{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_independent_and_monotonic() {
        let mut counter = LabelCounter::new();
        assert_eq!(counter.next_while(), WhileLabels(0));
        assert_eq!(counter.next_if(), IfLabels(0));
        assert_eq!(counter.next_while(), WhileLabels(1));
        assert_eq!(counter.next_while(), WhileLabels(2));
        assert_eq!(counter.next_if(), IfLabels(1));
    }

    #[test]
    fn test_label_names() {
        let w = WhileLabels(4);
        assert_eq!(w.begin(), "BEGIN_WHILE_4");
        assert_eq!(w.end(), "END_WHILE_4");
        let i = IfLabels(2);
        assert_eq!(i.if_true(), "IF_TRUE_2");
        assert_eq!(i.if_false(), "IF_FALSE_2");
        assert_eq!(i.end(), "END_IF_2");
    }
}
