#[macro_export]
macro_rules! benchdb {
    ($ctx: expr) => {
        {
            let out = $ctx.data().db.clone();

            out
        }
    }
}
