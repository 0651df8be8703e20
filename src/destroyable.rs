// implemented by components holding channel subscriptions that capture themselves;
// the Rc cycle is only broken by calling destroy
pub trait Destroyable {
    fn destroy(&mut self);
}
