#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mik_filter::{Converter, FilterError};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    nested: bool,
    start: u16,
    filter: Vec<u8>,
    sort: String,
}

fuzz_target!(|input: FuzzInput| {
    let builder = Converter::builder().disallow_columns(&["password"]);
    let converter = if input.nested {
        builder.nested_jsonb("meta", &["created_at"])
    } else {
        builder.allow_all_columns()
    }
    .build()
    .unwrap();

    let start = usize::from(input.start);

    // Any input: a conversion or an error, never a panic
    match converter.convert(&input.filter, start) {
        Ok(result) => {
            // One value per placeholder, numbered from `start`
            let mut expected = start;
            let sql = &result.conditions;
            let mut rest = sql.as_str();
            while let Some(pos) = rest.find('$') {
                rest = &rest[pos + 1..];
                let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
                if !digits.is_empty() {
                    assert_eq!(digits.parse::<usize>().unwrap(), expected, "{sql}");
                    expected += 1;
                }
            }
            assert_eq!(expected - start, result.values.len(), "{sql}");
            assert!(!sql.contains("\"password\""), "{sql}");

            // The condition must stay a single expression inside the WHERE clause
            let query = format!("SELECT * FROM test WHERE 1 AND {sql}");
            let statements = Parser::parse_sql(&PostgreSqlDialect {}, &query)
                .unwrap_or_else(|e| panic!("{query}: {e}"));
            assert_eq!(statements.len(), 1, "{query}");
        },
        Err(FilterError::InvalidConfiguration(_)) => assert_eq!(start, 0),
        Err(_) => {},
    }

    let _ = converter.convert_order_by(&input.sort);
});
