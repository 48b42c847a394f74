use quiz_core::model::Question;
use rand::Rng;
use rand::seq::SliceRandom;

/// Shuffle a question's options with the thread-local RNG.
#[must_use]
pub fn shuffle(question: Question) -> Question {
    shuffle_with(question, &mut rand::rng())
}

/// Apply a uniform random permutation to the four options and relabel them A–D.
///
/// The correct label is recomputed from the originally correct option's new position.
/// Option texts are not compared, so duplicated texts stay duplicated.
#[must_use]
pub fn shuffle_with<R: Rng + ?Sized>(question: Question, rng: &mut R) -> Question {
    let mut ranks = [0_usize, 1, 2, 3];
    ranks.shuffle(rng);
    question.reordered_by(|pos| ranks[pos])
}
