use std::future::IntoFuture;

// Original: https://github.com/HalsekiRaika/architectured/blob/e5caa5c7ae801d1aaac6e275b3ea0ef26d6ff26b/server/src/controller.rs
pub trait Intake<I>: 'static + Sync + Send {
    type To;
    fn emit(&self, input: I) -> Self::To;
}

/// Fallible [`Intake`]; request validation lives here.
pub trait TryIntake<I>: 'static + Sync + Send {
    type To;
    type Error;
    fn emit(&self, input: I) -> Result<Self::To, Self::Error>;
}

pub trait Exhaust<I>: 'static + Sync + Send {
    type To;
    fn emit(&self, input: I) -> Self::To;
}

pub struct Controller<T, P> {
    transformer: T,
    presenter: P,
}

impl<T, P> Controller<T, P> {
    pub fn new(transformer: T, presenter: P) -> Self {
        Self {
            transformer,
            presenter,
        }
    }

    pub fn intake<I>(self, input: I) -> Transformed<P, T::To>
    where
        T: Intake<I>,
    {
        Transformed {
            transformed: self.transformer.emit(input),
            presenter: self.presenter,
        }
    }

    pub fn try_intake<I>(self, input: I) -> Result<Transformed<P, T::To>, T::Error>
    where
        T: TryIntake<I>,
    {
        Ok(Transformed {
            transformed: self.transformer.emit(input)?,
            presenter: self.presenter,
        })
    }

    /// Runs `f` without any request input and presents its output.
    pub async fn bypass<F, Fut, O, E>(self, f: F) -> Result<P::To, E>
    where
        P: Exhaust<O>,
        F: FnOnce() -> Fut,
        Fut: IntoFuture<Output = Result<O, E>>,
    {
        Ok(self.presenter.emit(f().await?))
    }
}

pub struct Transformed<P, D> {
    transformed: D,
    presenter: P,
}

impl<P, D> Transformed<P, D> {
    pub async fn handle<F, Fut, O, E>(self, f: F) -> Result<P::To, E>
    where
        P: Exhaust<O>,
        F: FnOnce(D) -> Fut,
        Fut: IntoFuture<Output = Result<O, E>>,
    {
        Ok(self.presenter.emit(f(self.transformed).await?))
    }
}

#[cfg(test)]
mod test {
    use std::convert::Infallible;

    use super::{Controller, Exhaust, Intake, TryIntake};

    struct Doubler;

    impl Intake<i32> for Doubler {
        type To = i32;
        fn emit(&self, input: i32) -> Self::To {
            input * 2
        }
    }

    impl TryIntake<&'static str> for Doubler {
        type To = i32;
        type Error = String;
        fn emit(&self, input: &'static str) -> Result<Self::To, Self::Error> {
            input
                .parse::<i32>()
                .map(|value| value * 2)
                .map_err(|_| format!("not a number: {input}"))
        }
    }

    struct Printer;

    impl Exhaust<i32> for Printer {
        type To = String;
        fn emit(&self, input: i32) -> Self::To {
            format!("={input}")
        }
    }

    #[tokio::test]
    async fn intake_handle_and_present() {
        let out = Controller::new(Doubler, Printer)
            .intake(20)
            .handle(|doubled| async move { Ok::<_, Infallible>(doubled + 2) })
            .await
            .unwrap();
        assert_eq!(out, "=42");
    }

    #[tokio::test]
    async fn rejected_input_never_reaches_handler() {
        let rejected = Controller::new(Doubler, Printer).try_intake("forty");
        assert_eq!(rejected.err(), Some("not a number: forty".to_string()));

        let out = Controller::new(Doubler, Printer)
            .try_intake("21")
            .unwrap()
            .handle(|doubled| async move { Ok::<_, Infallible>(doubled) })
            .await
            .unwrap();
        assert_eq!(out, "=42");
    }
}
