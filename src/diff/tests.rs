#[cfg(test)]
mod tests {
    use crate::diff::{Arg, DerivativeMatrix, ParamKind, ParamRole, Signature, gradient, jacobian};
    use crate::graph::{Boundary, BranchPolicy};
    use crate::{Frame, GradError, Result, Tape, Var};

    use ndarray::Array2;

    fn f1(tape: &mut Tape, frame: &mut Frame) -> Result<Var> {
        let (x, y) = (frame.scalar(0)?, frame.scalar(1)?);
        let xx = tape.mul(x, x);
        let xy = tape.mul(x, y);
        Ok(tape.add(xx, xy))
    }

    fn f2(tape: &mut Tape, frame: &mut Frame) -> Result<()> {
        let (x, y) = (frame.scalar(0)?, frame.scalar(1)?);
        let xx = tape.mul(x, x);
        let first = tape.add(xx, y);
        let second = tape.mul(x, y);
        let out = frame.output(2)?;
        out.write(tape, 0, first)?;
        out.write(tape, 1, second)?;
        Ok(())
    }

    fn xy() -> Signature {
        Signature::new().scalar("x").scalar("y")
    }

    #[test]
    fn test_wrt_marks_other_scalars_fixed() {
        let signature = Signature::new()
            .scalar("x")
            .scalar("w")
            .scalar("b")
            .output("out")
            .wrt(["w"])
            .unwrap();

        let roles: Vec<ParamRole> = signature.params().iter().map(|p| p.role).collect();
        assert_eq!(
            roles,
            vec![ParamRole::Fixed, ParamRole::Active, ParamRole::Fixed, ParamRole::Output]
        );
        assert_eq!(signature.active_positions(), vec![1]);
    }

    #[test]
    fn test_wrt_list_parses_names() {
        let signature = Signature::new()
            .scalar("x")
            .scalar("w")
            .scalar("b")
            .wrt_list(" x , b ")
            .unwrap();
        assert_eq!(signature.active_positions(), vec![0, 2]);
    }

    #[test]
    fn test_unknown_parameter_fails_at_construction() {
        let err = xy().wrt(["z"]).unwrap_err();
        assert_eq!(
            err,
            GradError::UnknownParameter {
                name: "z".to_string(),
                declared: vec!["x".to_string(), "y".to_string()],
            }
        );
    }

    #[test]
    fn test_output_cannot_be_differentiated() {
        let err = xy().output("out").wrt(["out"]).unwrap_err();
        assert!(matches!(err, GradError::NotDifferentiable { .. }));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let signature = Signature::new().scalar("x").scalar("x");
        assert!(matches!(
            gradient(signature, f1),
            Err(GradError::DuplicateParameter { .. })
        ));
    }

    #[test]
    fn test_gradient_rejects_outputs() {
        let signature = xy().output("out");
        assert!(matches!(
            gradient(signature, f1),
            Err(GradError::OutputInGradient { .. })
        ));
    }

    #[test]
    fn test_gradient_arity_and_buffer_checks() {
        let df = gradient(xy(), f1).unwrap();

        let mut grads = [-1.0; 2];
        assert_eq!(
            df.execute(&[2.0], &mut grads),
            Err(GradError::ArityMismatch { expected: 2, actual: 1 })
        );

        let mut short = [-1.0; 1];
        assert_eq!(
            df.execute(&[2.0, 3.0], &mut short),
            Err(GradError::GradientBufferTooSmall { required: 2, actual: 1 })
        );
        assert_eq!(short, [-1.0]);
    }

    #[test]
    fn test_gradient_with_fixed_parameter() {
        let df = gradient(xy().wrt(["y"]).unwrap(), f1).unwrap();
        let mut grads = [0.0; 1];
        let value = df.execute(&[2.0, 3.0], &mut grads).unwrap();
        assert_eq!(value, 10.0);
        assert_eq!(grads, [2.0]);
        assert_eq!(df.num_active(), 1);
    }

    #[test]
    fn test_gradient_of_identity() {
        let df = gradient(Signature::new().scalar("x"), |_tape, frame| frame.scalar(0)).unwrap();
        let mut dx = [0.0];
        assert_eq!(df.execute(&[4.5], &mut dx).unwrap(), 4.5);
        assert_eq!(dx, [1.0]);
    }

    #[test]
    fn test_jacobian_role_mismatch() {
        let jf = jacobian(xy().output("out"), f2).unwrap();
        let mut out = [0.0; 2];
        let mut jac = DerivativeMatrix::new(2, 4);

        let err = jf
            .execute(
                &mut [Arg::Scalar(2.0), Arg::Output(&mut out), Arg::Scalar(3.0)],
                &mut jac,
            )
            .unwrap_err();
        assert_eq!(
            err,
            GradError::RoleMismatch {
                position: 1,
                expected: ParamKind::Scalar,
                actual: ParamKind::Output,
            }
        );
    }

    #[test]
    fn test_jacobian_too_small_leaves_buffers_untouched() {
        let jf = jacobian(xy().output("out"), f2).unwrap();
        let mut out = [9.0; 2];
        let mut jac = DerivativeMatrix::new(2, 3);
        jac[(0, 0)] = 5.0;

        let err = jf
            .execute(
                &mut [Arg::Scalar(2.0), Arg::Scalar(3.0), Arg::Output(&mut out)],
                &mut jac,
            )
            .unwrap_err();
        assert_eq!(
            err,
            GradError::MatrixTooSmall {
                rows: 2,
                cols: 4,
                actual_rows: 2,
                actual_cols: 3,
            }
        );
        assert_eq!(out, [9.0, 9.0]);
        assert_eq!(jac[(0, 0)], 5.0);
    }

    #[test]
    fn test_failing_target_writes_nothing() {
        let jf = jacobian(xy().output("out"), |tape, frame| {
            let x = frame.scalar(0)?;
            let out = frame.output(2)?;
            out.write(tape, 0, x)?;
            // Past the end of a two-slot buffer.
            out.write(tape, 2, x)?;
            Ok(())
        })
        .unwrap();

        let mut out = [9.0; 2];
        let mut jac = DerivativeMatrix::new(2, 4);
        jac[(0, 0)] = 5.0;
        let result = jf.execute(
            &mut [Arg::Scalar(2.0), Arg::Scalar(3.0), Arg::Output(&mut out)],
            &mut jac,
        );

        assert_eq!(result, Err(GradError::IndexOutOfBounds { index: 2, len: 2 }));
        assert_eq!(out, [9.0, 9.0]);
        assert_eq!(jac[(0, 0)], 5.0);
    }

    #[test]
    fn test_larger_sink_keeps_extra_cells() {
        let jf = jacobian(xy().output("out"), f2).unwrap();
        let mut out = [0.0; 2];
        let mut jac = Array2::from_elem((3, 6), -1.0);

        jf.execute(
            &mut [Arg::Scalar(2.0), Arg::Scalar(3.0), Arg::Output(&mut out)],
            &mut jac,
        )
        .unwrap();

        assert_eq!(jac[[0, 0]], 4.0);
        assert_eq!(jac[[1, 1]], 2.0);
        // Pass-through output columns are zeroed, cells beyond are not touched.
        assert_eq!(jac[[0, 2]], 0.0);
        assert_eq!(jac[[1, 3]], 0.0);
        assert_eq!(jac[[0, 4]], -1.0);
        assert_eq!(jac[[2, 0]], -1.0);
    }

    #[test]
    fn test_unwritten_output_slot_keeps_value() {
        let jf = jacobian(xy().output("out"), |tape, frame| {
            let x = frame.scalar(0)?;
            let squared = tape.square(x);
            frame.output(2)?.write(tape, 1, squared)?;
            Ok(())
        })
        .unwrap();

        let mut out = [7.5, 0.0];
        let jac = jf
            .compute(&mut [Arg::Scalar(3.0), Arg::Scalar(1.0), Arg::Output(&mut out)])
            .unwrap();

        assert_eq!(out, [7.5, 9.0]);
        assert_eq!(jac.row(0).to_vec(), vec![0.0, 0.0, 0.0, 0.0]);
        assert_eq!(jac.row(1).to_vec(), vec![6.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_output_first_ordering() {
        // Output buffer declared before the scalars.
        let signature = Signature::new().output("out").scalar("a").scalar("b");
        let jf = jacobian(signature, |tape, frame| {
            let (a, b) = (frame.scalar(1)?, frame.scalar(2)?);
            let q = tape.div(a, b);
            frame.output(0)?.write(tape, 0, q)?;
            Ok(())
        })
        .unwrap();

        let mut out = [0.0];
        let jac = jf
            .compute(&mut [Arg::Output(&mut out), Arg::Scalar(1.0), Arg::Scalar(4.0)])
            .unwrap();

        assert_eq!(out, [0.25]);
        assert_eq!((jac.rows(), jac.cols()), (1, 3));
        assert_eq!(jac[(0, 0)], 0.25);
        assert_eq!(jac[(0, 1)], -1.0 / 16.0);
    }

    #[test]
    fn test_multiple_output_buffers_flatten_in_order() {
        let signature = Signature::new()
            .scalar("x")
            .output("first")
            .scalar("y")
            .output("second");
        let jf = jacobian(signature, |tape, frame| {
            let (x, y) = (frame.scalar(0)?, frame.scalar(2)?);
            let sum = tape.add(x, y);
            let prod = tape.mul(x, y);
            frame.output(1)?.write(tape, 0, sum)?;
            frame.output(3)?.write(tape, 0, prod)?;
            frame.output(3)?.write(tape, 1, x)?;
            Ok(())
        })
        .unwrap();

        let mut first = [0.0];
        let mut second = [0.0; 2];
        let jac = jf
            .compute(&mut [
                Arg::Scalar(2.0),
                Arg::Output(&mut first),
                Arg::Scalar(5.0),
                Arg::Output(&mut second),
            ])
            .unwrap();

        assert_eq!(first, [7.0]);
        assert_eq!(second, [10.0, 2.0]);
        assert_eq!((jac.rows(), jac.cols()), (3, 5));
        assert_eq!(jac.row(0).to_vec(), vec![1.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(jac.row(1).to_vec(), vec![5.0, 2.0, 0.0, 0.0, 0.0]);
        assert_eq!(jac.row(2).to_vec(), vec![1.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_policy_reaches_the_tape() {
        let signature = Signature::new().scalar("z");
        let relu = |tape: &mut Tape, frame: &mut Frame| -> Result<Var> {
            let z = frame.scalar(0)?;
            Ok(tape.relu(z))
        };

        let inactive = gradient(signature.clone(), relu).unwrap();
        let active = gradient(signature, relu)
            .unwrap()
            .with_policy(BranchPolicy::new(Boundary::Active));

        let mut dz = [f64::NAN];
        inactive.execute(&[0.0], &mut dz).unwrap();
        assert_eq!(dz, [0.0]);
        active.execute(&[0.0], &mut dz).unwrap();
        assert_eq!(dz, [1.0]);
    }

    #[test]
    fn test_record_exposes_bindings() {
        let jf = jacobian(xy().output("out"), f2).unwrap();
        let mut out = [0.0; 2];
        let recording = jf
            .record(&[Arg::Scalar(2.0), Arg::Scalar(3.0), Arg::Output(&mut out)])
            .unwrap();

        assert_eq!(recording.inputs.len(), 2);
        assert_eq!(recording.outputs.len(), 2);
        assert_eq!(recording.outputs[0].value, 7.0);
        assert_eq!(recording.outputs[1].value, 6.0);
        // Recording alone does not write back.
        assert_eq!(out, [0.0, 0.0]);
    }

    #[test]
    fn test_evaluate_without_derivatives() {
        let df = gradient(xy(), f1).unwrap();
        assert_eq!(df.evaluate(&[2.0, 3.0]), Ok(10.0));
        assert!(matches!(
            df.evaluate(&[2.0]),
            Err(GradError::ArityMismatch { .. })
        ));

        // Buffers are filled, no derivative matrix is needed.
        let jf = jacobian(xy().output("out"), f2).unwrap();
        let mut out = [0.0; 2];
        jf.evaluate(&mut [Arg::Scalar(2.0), Arg::Scalar(3.0), Arg::Output(&mut out)])
            .unwrap();
        assert_eq!(out, [7.0, 6.0]);
    }

    #[test]
    fn test_max_with_zero_is_flat_at_kink_in_either_order() {
        let signature = Signature::new().scalar("z");
        let max_after = |tape: &mut Tape, frame: &mut Frame| -> Result<Var> {
            let z = frame.scalar(0)?;
            let zero = tape.constant(0.0);
            Ok(tape.max(z, zero))
        };
        let max_before = |tape: &mut Tape, frame: &mut Frame| -> Result<Var> {
            let z = frame.scalar(0)?;
            let zero = tape.constant(0.0);
            Ok(tape.max(zero, z))
        };
        let min_after = |tape: &mut Tape, frame: &mut Frame| -> Result<Var> {
            let z = frame.scalar(0)?;
            let zero = tape.constant(0.0);
            Ok(tape.min(z, zero))
        };

        let mut dz = [f64::NAN];
        gradient(signature.clone(), max_after).unwrap().execute(&[0.0], &mut dz).unwrap();
        assert_eq!(dz, [0.0]);
        gradient(signature.clone(), max_before).unwrap().execute(&[0.0], &mut dz).unwrap();
        assert_eq!(dz, [0.0]);
        gradient(signature.clone(), min_after).unwrap().execute(&[0.0], &mut dz).unwrap();
        assert_eq!(dz, [0.0]);

        let active = BranchPolicy::new(Boundary::Active);
        gradient(signature.clone(), max_after)
            .unwrap()
            .with_policy(active)
            .execute(&[0.0], &mut dz)
            .unwrap();
        assert_eq!(dz, [1.0]);
        gradient(signature, min_after)
            .unwrap()
            .with_policy(active)
            .execute(&[0.0], &mut dz)
            .unwrap();
        assert_eq!(dz, [1.0]);
    }
}
