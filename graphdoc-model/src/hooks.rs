use crate::Record;

/// Optional hook run on a freshly constructed record before loaded values
/// are assigned.
///
/// Most record types do NOT need this. Implement it when a type must seed
/// transient state that assigned values may then overwrite.
pub trait PreProcess: Send + Sync {
    fn pre_process(&self, record: &mut Record);
}

/// Optional hook run after a record has been fully loaded, before it is
/// returned to the caller.
///
/// Use this for derived or transient fields computed from loaded values.
pub trait PostProcess: Send + Sync {
    fn post_process(&self, record: &mut Record);
}

impl<F> PreProcess for F
where
    F: Fn(&mut Record) + Send + Sync,
{
    fn pre_process(&self, record: &mut Record) {
        self(record)
    }
}

impl<F> PostProcess for F
where
    F: Fn(&mut Record) + Send + Sync,
{
    fn post_process(&self, record: &mut Record) {
        self(record)
    }
}
