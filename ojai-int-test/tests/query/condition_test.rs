use ojai::condition::Op;
use ojai::document::Document;
use ojai::errors::ErrorKind;
use ojai_int_test::test_util::{
    cleanup, create_test_context, date, ids, insert_test_documents, run_test,
};

fn find_ids(ctx: &ojai_int_test::test_util::TestContext, condition: ojai::condition::Condition) -> ojai::errors::OjaiResult<Vec<String>> {
    let store = ctx.store()?;
    let query = ctx.connection().new_query()?.where_condition(condition).build()?;
    let documents = store
        .find_query(&query)?
        .collect::<Result<Vec<Document>, _>>()?;
    Ok(ids(&documents))
}

#[test]
fn test_equal_filter_returns_only_matches() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut store = ctx.store()?;
            let gold = ctx.connection().new_document()?.set_id("g").set("support", "gold").build()?;
            let silver = ctx.connection().new_document()?.set_id("s").set("support", "silver").build()?;
            store.insert_or_replace(&gold)?;
            store.insert_or_replace(&silver)?;
            store.flush()?;

            let condition = ctx
                .connection()
                .new_condition()?
                .is("support", Op::Equal, "gold")
                .build()?;
            assert_eq!(find_ids(&ctx, condition)?, vec!["g"]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_comparison_operators() {
    run_test(
        || create_test_context(),
        |ctx| {
            insert_test_documents(&mut ctx.store()?)?;
            let connection = ctx.connection();

            let cases = vec![
                (Op::Equal, 12, vec!["jdoe-1"]),
                (Op::NotEqual, 12, vec!["asmith-2", "bking-3"]),
                (Op::Less, 12, vec!["asmith-2"]),
                (Op::LessOrEqual, 12, vec!["asmith-2", "jdoe-1"]),
                (Op::Greater, 12, vec!["bking-3"]),
                (Op::GreaterOrEqual, 12, vec!["bking-3", "jdoe-1"]),
            ];
            for (op, fans, expected) in cases {
                let condition = connection.new_condition()?.is("fans", op, fans).build()?;
                assert_eq!(find_ids(&ctx, condition)?, expected, "fans {} 12", op);
            }
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_date_range() {
    run_test(
        || create_test_context(),
        |ctx| {
            insert_test_documents(&mut ctx.store()?)?;
            let condition = ctx
                .connection()
                .new_condition()?
                .and()
                .is("yelping_since", Op::GreaterOrEqual, date("2011-01-01"))
                .is("yelping_since", Op::Less, date("2013-01-01"))
                .close()
                .build()?;
            assert_eq!(find_ids(&ctx, condition)?, vec!["jdoe-1"]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_nested_and_or() {
    run_test(
        || create_test_context(),
        |ctx| {
            insert_test_documents(&mut ctx.store()?)?;
            // gold users in Lyon, or anyone with more than 30 fans
            let condition = ctx
                .connection()
                .new_condition()?
                .or()
                .and()
                .is("support", Op::Equal, "gold")
                .is("address.city", Op::Equal, "Lyon")
                .close()
                .is("fans", Op::Greater, 30)
                .close()
                .build()?;
            assert_eq!(find_ids(&ctx, condition)?, vec!["bking-3"]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_exists_in_and_matches() {
    run_test(
        || create_test_context(),
        |ctx| {
            insert_test_documents(&mut ctx.store()?)?;
            let connection = ctx.connection();

            let no_tags = connection.new_condition()?.not_exists("tags").build()?;
            assert_eq!(find_ids(&ctx, no_tags)?, vec!["bking-3"]);

            let cities = connection
                .new_condition()?
                .in_values("address.city", vec!["Lyon", "Nice"])
                .build()?;
            assert_eq!(find_ids(&ctx, cities)?, vec!["asmith-2"]);

            let names = connection.new_condition()?.matches("name", "^(Bob|John) ").build()?;
            assert_eq!(find_ids(&ctx, names)?, vec!["bking-3", "jdoe-1"]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_negation() {
    run_test(
        || create_test_context(),
        |ctx| {
            insert_test_documents(&mut ctx.store()?)?;
            let gold = ctx
                .connection()
                .new_condition()?
                .is("support", Op::Equal, "gold")
                .build()?;
            assert_eq!(find_ids(&ctx, gold.not())?, vec!["asmith-2"]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_invalid_conditions() {
    run_test(
        || create_test_context(),
        |ctx| {
            let connection = ctx.connection();

            let err = connection
                .new_condition()?
                .is("tags", Op::Less, vec!["a"])
                .build()
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidCondition);

            let err = connection.new_condition()?.is("a..b", Op::Equal, 1).build().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidCondition);
            assert!(err.is_caused_by(&ErrorKind::InvalidFieldPath));

            let err = connection.new_condition()?.and().build().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidCondition);

            let err = connection.new_condition()?.matches("name", "(").build().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidCondition);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
