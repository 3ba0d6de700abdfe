//! Game records: the referee's questions, the players' answers, and batches
//! of played rounds.
//!
//! Bits are stored as `bool`, so every record is in `{0,1}` by construction.
//! The CHSH win condition is `a ⊕ b = x · y`: the players must give equal
//! answers unless both questions are 1, in which case they must differ.

/// Question bits sent by the referee: `x` to Alice, `y` to Bob.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Questions {
    pub x: bool,
    pub y: bool,
}

impl Questions {
    pub fn new(x: bool, y: bool) -> Self {
        Self { x, y }
    }

    /// Index of the `(x, y)` cell in `0..4`, ordered `00, 01, 10, 11`.
    pub fn cell_index(self) -> usize {
        (usize::from(self.x) << 1) | usize::from(self.y)
    }

    /// The four question combinations in cell order.
    pub fn all() -> [Questions; 4] {
        [
            Questions::new(false, false),
            Questions::new(false, true),
            Questions::new(true, false),
            Questions::new(true, true),
        ]
    }

    /// The parity `a ⊕ b` that wins for these questions.
    pub fn winning_parity(self) -> bool {
        self.x && self.y
    }
}

/// Answer bits returned by the players: `a` from Alice, `b` from Bob.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Answers {
    pub a: bool,
    pub b: bool,
}

impl Answers {
    pub fn new(a: bool, b: bool) -> Self {
        Self { a, b }
    }
}

/// One played round.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct GameRecord {
    questions: Questions,
    answers: Answers,
}

impl GameRecord {
    pub fn new(questions: Questions, answers: Answers) -> Self {
        Self { questions, answers }
    }

    pub fn questions(&self) -> Questions {
        self.questions
    }

    pub fn answers(&self) -> Answers {
        self.answers
    }

    /// Bits as `[x, y, a, b]` in `{0,1}`.
    pub fn bits(&self) -> [u8; 4] {
        [
            u8::from(self.questions.x),
            u8::from(self.questions.y),
            u8::from(self.answers.a),
            u8::from(self.answers.b),
        ]
    }

    /// True if the answers satisfy `a ⊕ b = x · y`.
    pub fn wins(&self) -> bool {
        (self.answers.a ^ self.answers.b) == self.questions.winning_parity()
    }
}

/// The rounds produced by one strategy invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameBatch {
    records: Vec<GameRecord>,
}

impl GameBatch {
    /// Wrap arbitrary records. The batch may be empty; strategies never
    /// produce an empty one.
    pub fn from_records(records: Vec<GameRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[GameRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GameRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a GameBatch {
    type Item = &'a GameRecord;
    type IntoIter = std::slice::Iter<'a, GameRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
