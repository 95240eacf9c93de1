//! Integration tests exercising the compiler and runtime together.

#[cfg(test)]
mod concurrency;
#[cfg(test)]
mod lookaround;
#[cfg(test)]
mod matching;
#[cfg(test)]
mod reference;
#[cfg(test)]
mod split;
