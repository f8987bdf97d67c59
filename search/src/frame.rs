//! Frames and the traversal stack.
//!
//! A [`Frame`] is the bisection history at one tree depth: the full sibling
//! set it started from, plus the chain of halves derived from it. Only the
//! top two entries are ever compared. The [`TraversalStack`] holds one frame
//! per depth currently being explored; it is the bisector's entire state.

use bisect_kernel::tree::CandidateNode;

use crate::candidate::CandidateSet;

/// What [`Frame::advance`] did after a pass verdict.
#[derive(Debug)]
pub(crate) enum FrameAdvance<N> {
    /// The top entry was a first half; it was replaced by its complement.
    Complement(CandidateSet<N>),
    /// The top entry was resolved and popped; the frame still has entries.
    Popped,
    /// Only the base set remained: the whole frame is resolved.
    Cleared,
}

/// The stack of candidate sets explored at one depth.
///
/// Never empty: `base` is always present, `halves` may be empty.
#[derive(Debug, Clone)]
pub struct Frame<N> {
    base: CandidateSet<N>,
    halves: Vec<CandidateSet<N>>,
}

impl<N: CandidateNode> Frame<N> {
    /// A frame that tests `base` as a whole first.
    #[must_use]
    pub fn new(base: CandidateSet<N>) -> Self {
        Self {
            base,
            halves: Vec::new(),
        }
    }

    /// A frame that starts on `base`'s first half.
    ///
    /// A singleton `base` has no first half; the frame then starts on `base`.
    #[must_use]
    pub fn pre_split(base: CandidateSet<N>) -> Self {
        let mut frame = Self::new(base);
        if let Some(first) = frame.base.first_half() {
            frame.halves.push(first);
        }
        frame
    }

    /// The set this frame was opened with.
    #[must_use]
    pub fn base(&self) -> &CandidateSet<N> {
        &self.base
    }

    /// Number of entries, counting the base set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.halves.len() + 1
    }

    /// Always `false`: a frame holds at least its base set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The active (topmost) entry.
    #[must_use]
    pub fn top(&self) -> &CandidateSet<N> {
        self.halves.last().unwrap_or(&self.base)
    }

    /// All entries, bottom (base) first.
    pub fn entries(&self) -> impl Iterator<Item = &CandidateSet<N>> {
        std::iter::once(&self.base).chain(self.halves.iter())
    }

    pub(crate) fn push(&mut self, set: CandidateSet<N>) {
        self.halves.push(set);
    }

    /// Resolve the top entry after a pass verdict.
    pub(crate) fn advance(&mut self) -> FrameAdvance<N> {
        let Some(current) = self.halves.last() else {
            return FrameAdvance::Cleared;
        };
        let parent = match self.halves.len() {
            1 => &self.base,
            n => &self.halves[n - 2],
        };
        if parent.same_split_stage(current) {
            if let Some(complement) = parent.second_half() {
                let last = self.halves.len() - 1;
                self.halves[last] = complement.clone();
                return FrameAdvance::Complement(complement);
            }
        }
        // A second half (or an otherwise resolved entry): drop it.
        self.halves.pop();
        FrameAdvance::Popped
    }
}

/// One frame per tree depth under exploration; bottom = forest roots.
#[derive(Debug, Clone)]
pub struct TraversalStack<N> {
    frames: Vec<Frame<N>>,
}

impl<N: CandidateNode> TraversalStack<N> {
    /// A stack holding a single frame over `roots`.
    #[must_use]
    pub fn new(roots: CandidateSet<N>) -> Self {
        Self {
            frames: vec![Frame::new(roots)],
        }
    }

    /// Number of frames (tree depths) currently open.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The current candidate: top entry of the top frame.
    #[must_use]
    pub fn current(&self) -> Option<&CandidateSet<N>> {
        self.frames.last().map(Frame::top)
    }

    /// Frames, bottom (roots) first.
    #[must_use]
    pub fn frames(&self) -> &[Frame<N>] {
        &self.frames
    }

    pub(crate) fn top_mut(&mut self) -> Option<&mut Frame<N>> {
        self.frames.last_mut()
    }

    pub(crate) fn push(&mut self, frame: Frame<N>) {
        self.frames.push(frame);
    }

    pub(crate) fn pop(&mut self) {
        self.frames.pop();
    }
}
