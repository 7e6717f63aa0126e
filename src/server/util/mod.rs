pub(crate) mod id;
pub(crate) mod password;
pub(crate) mod price;
pub(crate) mod time;
pub(crate) mod validation;
