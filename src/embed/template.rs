//! Embedded text with `__NAME__` placeholders.

use std::marker::PhantomData;

/// Values substituted into a [`Template`].
///
/// Each pair is a placeholder name (without the surrounding underscores)
/// and its already-escaped replacement.
pub trait Placeholders {
    fn pairs(&self) -> Vec<(&'static str, String)>;
}

/// Static text bound to the placeholder set it expects.
#[derive(Debug, Clone, Copy)]
pub struct Template<P> {
    text: &'static str,
    _placeholders: PhantomData<P>,
}

impl<P> Template<P> {
    pub const fn new(text: &'static str) -> Self {
        Self {
            text,
            _placeholders: PhantomData,
        }
    }
}

impl<P: Placeholders> Template<P> {
    pub fn render(&self, values: &P) -> String {
        values
            .pairs()
            .into_iter()
            .fold(self.text.to_owned(), |text, (name, value)| {
                text.replace(&format!("__{name}__"), &value)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Greeting(&'static str);

    impl Placeholders for Greeting {
        fn pairs(&self) -> Vec<(&'static str, String)> {
            vec![("WHO", self.0.to_owned())]
        }
    }

    #[test]
    fn test_every_occurrence_replaced() {
        let template: Template<Greeting> = Template::new("hi __WHO__, bye __WHO__ (__OTHER__)");
        assert_eq!(template.render(&Greeting("ann")), "hi ann, bye ann (__OTHER__)");
    }
}
