#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Field {
    #[default]
    ClientId,
    ClientSecret,
    Shop,
    Scopes,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::ClientId,
        Field::ClientSecret,
        Field::Shop,
        Field::Scopes,
    ];

    pub fn next(self) -> Self {
        match self {
            Field::ClientId => Field::ClientSecret,
            Field::ClientSecret => Field::Shop,
            Field::Shop => Field::Scopes,
            Field::Scopes => Field::ClientId,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Field::ClientId => Field::Scopes,
            Field::ClientSecret => Field::ClientId,
            Field::Shop => Field::ClientSecret,
            Field::Scopes => Field::Shop,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::ClientId => "Client ID",
            Field::ClientSecret => "Client Secret",
            Field::Shop => "Shop",
            Field::Scopes => "Scopes",
        }
    }

    pub fn is_secret(self) -> bool {
        matches!(self, Field::ClientSecret)
    }
}

#[cfg(test)]
mod tests {
    use super::Field;

    #[test]
    fn next_and_previous_cycle_through_every_field() {
        let mut field = Field::default();
        for expected in Field::ALL.iter().skip(1).chain(Field::ALL.iter().take(1)) {
            field = field.next();
            assert_eq!(field, *expected);
        }
        for _ in 0..Field::ALL.len() {
            assert_eq!(field.next().previous(), field);
            field = field.previous();
        }
    }
}
