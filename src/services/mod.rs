pub(crate) mod gradebook;
